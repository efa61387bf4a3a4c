use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::capture::{
    CaptureContext, CaptureError, CaptureSource, CapturedPacket, ChannelMap, DigitalTrace,
    I2cPacket, SpiPacket, UartPacket,
};
use crate::registry::DecoderConfig;

use super::error::JsonSourceError;
use super::reader::{
    default_cs_asserted, default_initial_high, hex_bytes, validate_i2c_address,
    validate_transitions,
};

#[derive(Debug, Deserialize)]
struct CaptureFile {
    sample_count: u64,
    #[serde(default)]
    channels: BTreeMap<String, TraceEntry>,
    #[serde(default)]
    decoders: Option<DecoderConfig>,
    /// Converted one by one so errors can name the packet.
    #[serde(default)]
    packets: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TraceEntry {
    #[serde(default = "default_initial_high")]
    initial_high: bool,
    #[serde(default)]
    transitions: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "bus", rename_all = "lowercase")]
enum PacketEntry {
    Uart {
        channel: String,
        baud_rate: u32,
        start_sample: u64,
        #[serde(deserialize_with = "hex_bytes")]
        data: Vec<u8>,
    },
    Spi {
        #[serde(default, deserialize_with = "hex_bytes")]
        mosi: Vec<u8>,
        #[serde(default, deserialize_with = "hex_bytes")]
        miso: Vec<u8>,
        #[serde(default = "default_cs_asserted")]
        cs_asserted: bool,
    },
    I2c {
        address: u8,
        write: bool,
        #[serde(deserialize_with = "hex_bytes")]
        data: Vec<u8>,
    },
}

/// `CaptureSource` backed by a JSON capture document.
pub struct JsonCaptureSource {
    channels: ChannelMap,
    decoders: Option<DecoderConfig>,
    packets: VecDeque<CapturedPacket>,
}

impl JsonCaptureSource {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let file = File::open(path).map_err(CaptureError::from)?;
        let raw: CaptureFile =
            serde_json::from_reader(BufReader::new(file)).map_err(CaptureError::from)?;
        build_source(raw).map_err(CaptureError::from)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CaptureError> {
        let raw: CaptureFile = serde_json::from_str(text).map_err(CaptureError::from)?;
        build_source(raw).map_err(CaptureError::from)
    }

    /// Decoder selection stored in the capture, if any.
    pub fn decoders(&self) -> Option<&DecoderConfig> {
        self.decoders.as_ref()
    }

    pub fn remaining(&self) -> usize {
        self.packets.len()
    }
}

impl CaptureSource for JsonCaptureSource {
    fn context(&self) -> &dyn CaptureContext {
        &self.channels
    }

    fn next_packet(&mut self) -> Result<Option<CapturedPacket>, CaptureError> {
        Ok(self.packets.pop_front())
    }
}

fn build_source(raw: CaptureFile) -> Result<JsonCaptureSource, JsonSourceError> {
    let mut channels = ChannelMap::default();
    for (name, entry) in raw.channels {
        validate_transitions(&name, &entry.transitions, raw.sample_count)?;
        let trace = DigitalTrace::new(entry.initial_high, entry.transitions, raw.sample_count);
        channels.insert(name, trace);
    }

    let packets = raw
        .packets
        .into_iter()
        .enumerate()
        .map(|(index, entry)| convert_packet(index, entry))
        .collect::<Result<VecDeque<_>, _>>()?;

    Ok(JsonCaptureSource {
        channels,
        decoders: raw.decoders,
        packets,
    })
}

fn convert_packet(
    index: usize,
    value: serde_json::Value,
) -> Result<CapturedPacket, JsonSourceError> {
    let entry: PacketEntry =
        serde_json::from_value(value).map_err(|err| JsonSourceError::Invalid {
            context: format!("packet {index}"),
            message: err.to_string(),
        })?;
    Ok(match entry {
        PacketEntry::Uart {
            channel,
            baud_rate,
            start_sample,
            data,
        } => CapturedPacket::Uart(UartPacket {
            data,
            baud_rate,
            channel,
            start_sample,
        }),
        PacketEntry::Spi {
            mosi,
            miso,
            cs_asserted,
        } => CapturedPacket::Spi(SpiPacket {
            mosi,
            miso,
            cs_asserted,
        }),
        PacketEntry::I2c {
            address,
            write,
            data,
        } => {
            validate_i2c_address(index, address)?;
            CapturedPacket::I2c(I2cPacket {
                address,
                is_write: write,
                data,
            })
        }
    })
}
