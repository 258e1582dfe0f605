//! Runtime bodies of the built-in functions.
//!
//! Arity and argument kinds were validated when the expression was
//! parsed, so bodies only guard against conditions that are invisible
//! statically, such as a CIDR literal that does not parse.

use ipnet::IpNet;
use md5::Md5;
use probeql_types::Value;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::net::IpAddr;

use crate::catalog::FunctionError;

fn str_arg(func: &'static str, args: &[Value], idx: usize) -> Result<String, FunctionError> {
    args[idx]
        .string_form()
        .ok_or_else(|| FunctionError::invocation(func, format!("argument #{} is not a string", idx + 1)))
}

fn ip_arg(func: &'static str, args: &[Value], idx: usize) -> Result<IpAddr, FunctionError> {
    if let Some(ip) = args[idx].as_ip() {
        return Ok(ip);
    }
    let s = str_arg(func, args, idx)?;
    s.parse()
        .map_err(|_| FunctionError::invocation(func, format!("{s} is not a valid IP address")))
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

pub fn cidr_contains(args: &[Value]) -> Result<Value, FunctionError> {
    let ip = ip_arg("CIDR_CONTAINS", args, 0)?;
    let cidr = str_arg("CIDR_CONTAINS", args, 1)?;
    let net: IpNet = cidr
        .parse()
        .map_err(|_| FunctionError::invocation("CIDR_CONTAINS", format!("{cidr} is not a valid CIDR block")))?;
    Ok(Value::Bool(net.contains(&ip)))
}

pub fn md5(args: &[Value]) -> Result<Value, FunctionError> {
    let data = str_arg("MD5", args, 0)?;
    Ok(Value::string(hex_digest(&Md5::digest(data.as_bytes()))))
}

pub fn sha1(args: &[Value]) -> Result<Value, FunctionError> {
    let data = str_arg("SHA1", args, 0)?;
    Ok(Value::string(hex_digest(&Sha1::digest(data.as_bytes()))))
}

pub fn sha256(args: &[Value]) -> Result<Value, FunctionError> {
    let data = str_arg("SHA256", args, 0)?;
    Ok(Value::string(hex_digest(&Sha256::digest(data.as_bytes()))))
}

pub fn concat(args: &[Value]) -> Result<Value, FunctionError> {
    let mut out = str_arg("CONCAT", args, 0)?;
    out.push_str(&str_arg("CONCAT", args, 1)?);
    Ok(Value::string(out))
}

pub fn lower(args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::string(str_arg("LOWER", args, 0)?.to_lowercase()))
}

pub fn upper(args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::string(str_arg("UPPER", args, 0)?.to_uppercase()))
}

pub fn ltrim(args: &[Value]) -> Result<Value, FunctionError> {
    let s = str_arg("LTRIM", args, 0)?;
    let prefix = str_arg("LTRIM", args, 1)?;
    Ok(Value::string(
        s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_string(),
    ))
}

pub fn rtrim(args: &[Value]) -> Result<Value, FunctionError> {
    let s = str_arg("RTRIM", args, 0)?;
    let suffix = str_arg("RTRIM", args, 1)?;
    Ok(Value::string(
        s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_string(),
    ))
}

pub fn replace(args: &[Value]) -> Result<Value, FunctionError> {
    let s = str_arg("REPLACE", args, 0)?;
    let old = str_arg("REPLACE", args, 1)?;
    let new = str_arg("REPLACE", args, 2)?;
    Ok(Value::string(s.replace(old.as_str(), &new)))
}

pub fn length(args: &[Value]) -> Result<Value, FunctionError> {
    let len = match &args[0] {
        Value::Slice(items) => items.len(),
        other => other
            .string_form()
            .ok_or_else(|| FunctionError::invocation("LENGTH", "argument #1 is not a string or slice"))?
            .chars()
            .count(),
    };
    Ok(Value::Int32(len as i32))
}

pub fn indexof(args: &[Value]) -> Result<Value, FunctionError> {
    let s = str_arg("INDEXOF", args, 0)?;
    let sub = str_arg("INDEXOF", args, 1)?;
    let idx = s.find(sub.as_str()).map(|i| i as i32).unwrap_or(-1);
    Ok(Value::Int32(idx))
}

pub fn split(args: &[Value]) -> Result<Value, FunctionError> {
    let s = str_arg("SPLIT", args, 0)?;
    let sep = str_arg("SPLIT", args, 1)?;
    let parts = s
        .split(sep.as_str())
        .map(Value::string)
        .collect::<Vec<_>>();
    Ok(Value::Slice(parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn s(v: &str) -> Value {
        Value::string(v)
    }

    #[rstest]
    #[case("192.168.1.5", "192.168.1.0/24", true)]
    #[case("192.168.2.5", "192.168.1.0/24", false)]
    #[case("2001:db8::1", "2001:db8::/32", true)]
    fn test_cidr_contains(#[case] ip: &str, #[case] cidr: &str, #[case] expected: bool) {
        let verdict = cidr_contains(&[s(ip), s(cidr)]).unwrap();
        assert!(matches!(verdict, Value::Bool(b) if b == expected));
    }

    #[test]
    fn test_cidr_contains_accepts_ip_values() {
        let ip = Value::Ip("172.17.12.4".parse().unwrap());
        let verdict = cidr_contains(&[ip, s("172.17.0.0/16")]).unwrap();
        assert!(matches!(verdict, Value::Bool(true)));
    }

    #[test]
    fn test_cidr_contains_rejects_malformed_block() {
        let err = cidr_contains(&[s("10.0.0.1"), s("10.0.0.0/99")]).unwrap_err();
        assert!(err.to_string().contains("not a valid CIDR block"));
    }

    #[test]
    fn test_digests() {
        assert_eq!(
            md5(&[s("hello")]).unwrap().as_str(),
            Some("5d41402abc4b2a76b9719d911017c592")
        );
        assert_eq!(
            sha1(&[s("hello")]).unwrap().as_str(),
            Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
        );
        assert_eq!(
            sha256(&[s("hello")]).unwrap().as_str(),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
    }

    #[test]
    fn test_string_helpers() {
        assert_eq!(concat(&[s("cmd"), s(".exe")]).unwrap().as_str(), Some("cmd.exe"));
        assert_eq!(lower(&[s("SvcHost.EXE")]).unwrap().as_str(), Some("svchost.exe"));
        assert_eq!(upper(&[s("cmd.exe")]).unwrap().as_str(), Some("CMD.EXE"));
        assert_eq!(ltrim(&[s("/usr/bin/bash"), s("/usr")]).unwrap().as_str(), Some("/bin/bash"));
        assert_eq!(rtrim(&[s("cmd.exe"), s(".exe")]).unwrap().as_str(), Some("cmd"));
        assert_eq!(
            replace(&[s("open-close-open"), s("open"), s("shut")]).unwrap().as_str(),
            Some("shut-close-shut")
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        assert!(matches!(length(&[s("héllo")]).unwrap(), Value::Int32(5)));
        let slice = Value::Slice(vec![s("a"), s("b")]);
        assert!(matches!(length(&[slice]).unwrap(), Value::Int32(2)));
    }

    #[test]
    fn test_indexof_and_split() {
        assert!(matches!(indexof(&[s("svchost.exe"), s(".exe")]).unwrap(), Value::Int32(7)));
        assert!(matches!(indexof(&[s("svchost.exe"), s("cmd")]).unwrap(), Value::Int32(-1)));
        let parts = split(&[s("a;b;c"), s(";")]).unwrap();
        match parts {
            Value::Slice(items) => {
                let got: Vec<_> = items.iter().filter_map(Value::as_str).collect();
                assert_eq!(got, vec!["a", "b", "c"]);
            }
            other => panic!("expected slice, got {other:?}"),
        }
    }
}
