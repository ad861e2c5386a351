//! OID 生成与值解码，均为纯函数。

pub mod decode;
pub mod oid;

pub use decode::{
    decode_counter, decode_datetime, decode_distance, decode_integer, decode_ip, decode_name,
    decode_offline_reason, decode_optical_power, decode_serial, decode_status, decode_text,
    extract_index, format_bytes, format_duration, DeviceDateTime,
};
pub use oid::{
    decode_string_index, encode, encode_string_index, monitor_index, onu_index, type_index,
    ConfigTable, EntityKind, MonitorAttribute, OnuAttribute, PonAttribute, PonCounter,
};
