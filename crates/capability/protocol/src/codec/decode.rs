//! 原始 SNMP 值 → 领域值。

use crate::error::DecodeError;
use crate::types::SnmpValue;
use chrono::{DateTime, NaiveDate, Utc};
use domain::{OfflineReason, OnuStatus};
use std::fmt;

/// 设备日期时间（8 字节：年 2B 大端、月、日、时、分、秒、保留）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeviceDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

fn check_field(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), DecodeError> {
    if value < min || value > max {
        return Err(DecodeError::DateField {
            field,
            value: u32::from(value),
        });
    }
    Ok(())
}

impl DeviceDateTime {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != 8 {
            return Err(DecodeError::DateLength(bytes.len()));
        }
        let value = Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day: bytes[3],
            hour: bytes[4],
            minute: bytes[5],
            second: bytes[6],
        };
        value.validate()?;
        Ok(value)
    }

    pub fn validate(&self) -> Result<(), DecodeError> {
        check_field("month", self.month, 1, 12)?;
        check_field("day", self.day, 1, 31)?;
        check_field("hour", self.hour, 0, 23)?;
        check_field("minute", self.minute, 0, 59)?;
        check_field("second", self.second, 0, 59)
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let [hi, lo] = self.year.to_be_bytes();
        [
            hi,
            lo,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            0,
        ]
    }

    /// 转为 UTC 时间；日历上不存在的日期（如 2 月 30 日）返回 `None`。
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
        .map(|naive| naive.and_utc())
    }
}

impl fmt::Display for DeviceDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

pub fn decode_datetime(value: &SnmpValue) -> Result<DeviceDateTime, DecodeError> {
    match value {
        SnmpValue::OctetString(bytes) => DeviceDateTime::from_bytes(bytes),
        other => Err(DecodeError::UnexpectedType {
            expected: "octet-string",
            actual: other.type_name(),
        }),
    }
}

pub fn decode_integer(value: &SnmpValue) -> Result<i64, DecodeError> {
    value.as_integer().ok_or(DecodeError::UnexpectedType {
        expected: "integer",
        actual: value.type_name(),
    })
}

/// 光功率：`v × 0.002 − 30`，保留两位小数（四舍五入，远离零）。
pub fn decode_optical_power(value: &SnmpValue) -> Result<String, DecodeError> {
    let raw = match value {
        SnmpValue::Integer(v) => *v,
        other => {
            return Err(DecodeError::UnexpectedType {
                expected: "integer",
                actual: other.type_name(),
            });
        }
    };
    // 以千分之一 dBm 为单位计算，避免浮点误差
    let milli = raw * 2 - 30_000;
    let hundredths = if milli >= 0 {
        (milli + 5) / 10
    } else {
        (milli - 5) / 10
    };
    let sign = if hundredths < 0 { "-" } else { "" };
    let abs = hundredths.abs();
    Ok(format!("{sign}{}.{:02}", abs / 100, abs % 100))
}

pub fn decode_status(value: &SnmpValue) -> OnuStatus {
    match value {
        SnmpValue::Integer(code) => OnuStatus::from_code(*code),
        _ => OnuStatus::Unknown,
    }
}

pub fn decode_offline_reason(value: &SnmpValue) -> OfflineReason {
    match value {
        SnmpValue::Integer(code) => OfflineReason::from_code(*code),
        _ => OfflineReason::Unknown,
    }
}

fn strip_prefix(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"1,").unwrap_or(bytes)
}

fn is_printable(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| (32..=126).contains(b))
}

fn to_hex(bytes: &[u8], upper: bool) -> String {
    bytes
        .iter()
        .map(|b| {
            if upper {
                format!("{b:02X}")
            } else {
                format!("{b:02x}")
            }
        })
        .collect()
}

/// GPON 序列号：4 字节厂商 ASCII + 4 字节十六进制。
pub fn decode_serial(value: &SnmpValue) -> String {
    let Some(bytes) = value.as_bytes().map(strip_prefix) else {
        return String::new();
    };
    if bytes.len() >= 8 && is_printable(bytes) {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    if bytes.len() < 8 {
        if is_printable(bytes) {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        return to_hex(bytes, false);
    }
    let vendor = String::from_utf8_lossy(&bytes[..4]);
    format!("{vendor}{}", to_hex(&bytes[4..8], true))
}

/// 名称类文本，非字符串值返回 `"Unknown"`。
pub fn decode_name(value: &SnmpValue) -> String {
    match value.as_bytes() {
        Some(bytes) => String::from_utf8_lossy(strip_prefix(bytes)).into_owned(),
        None => "Unknown".to_string(),
    }
}

/// 普通文本，非字符串值返回空串。
pub fn decode_text(value: &SnmpValue) -> String {
    match value.as_bytes() {
        Some(bytes) => String::from_utf8_lossy(strip_prefix(bytes)).into_owned(),
        None => String::new(),
    }
}

pub fn decode_ip(value: &SnmpValue) -> String {
    match value {
        SnmpValue::IpAddress([a, b, c, d]) => format!("{a}.{b}.{c}.{d}"),
        SnmpValue::OctetString(bytes) if bytes.len() == 4 && !is_printable(bytes) => {
            format!("{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
        }
        other => decode_text(other),
    }
}

pub fn decode_distance(value: &SnmpValue) -> String {
    match value {
        SnmpValue::Integer(v) => v.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// 取点分 OID 文本最后一个分量作为索引；非数字返回 0。
pub fn extract_index(oid: &str) -> u32 {
    oid.rsplit('.')
        .next()
        .and_then(|part| part.trim().parse::<u32>().ok())
        .unwrap_or(0)
}

/// 计数器值；负整数与非数值类型视为格式错误。
pub fn decode_counter(value: &SnmpValue) -> Result<u64, DecodeError> {
    match value {
        SnmpValue::Counter64(v) => Ok(*v),
        SnmpValue::Counter32(v) | SnmpValue::Gauge32(v) => Ok(u64::from(*v)),
        SnmpValue::Integer(v) if *v >= 0 => Ok(*v as u64),
        other => Err(DecodeError::UnexpectedType {
            expected: "counter",
            actual: other.type_name(),
        }),
    }
}

/// 字节量的可读形式：`"512 bytes"`、`"1.50 KB"`、`"2.00 MB"`、`"1.25 GB"`。
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    let scaled = |unit: u64, suffix: &str| format!("{:.2} {suffix}", bytes as f64 / unit as f64);
    match bytes {
        b if b >= GB => scaled(GB, "GB"),
        b if b >= MB => scaled(MB, "MB"),
        b if b >= KB => scaled(KB, "KB"),
        b => format!("{b} bytes"),
    }
}

/// `"X days Y hours Z minutes S seconds"`。
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3_600;
    let minutes = seconds % 3_600 / 60;
    let secs = seconds % 60;
    format!("{days} days {hours} hours {minutes} minutes {secs} seconds")
}
