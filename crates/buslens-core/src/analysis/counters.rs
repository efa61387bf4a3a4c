use std::collections::HashMap;

use crate::capture::Bus;
use crate::decoder::DecodeOutcome;
use crate::{BaudChange, DecodeSummary};

/// Running counters for one capture session.
#[derive(Debug, Default)]
pub(crate) struct SessionCounters {
    summary: DecodeSummary,
    /// Last baud rate reported per UART channel.
    baud_overrides: HashMap<String, u32>,
}

impl SessionCounters {
    pub(crate) fn add_packet(&mut self, bus: Bus) {
        self.summary.packets_total += 1;
        match bus {
            Bus::Uart => self.summary.uart_packets += 1,
            Bus::Spi => self.summary.spi_packets += 1,
            Bus::I2c => self.summary.i2c_packets += 1,
        }
    }

    pub(crate) fn add_outcome(&mut self, outcome: DecodeOutcome) {
        if outcome == DecodeOutcome::Malformed {
            self.summary.malformed_packets += 1;
        }
    }

    /// Baud rate a UART packet on `channel` is recovered at from now on.
    pub(crate) fn baud_override(&self, channel: &str) -> Option<u32> {
        self.baud_overrides.get(channel).copied()
    }

    pub(crate) fn add_baud_change(&mut self, packet_index: u64, channel: &str, from: u32, to: u32) {
        self.baud_overrides.insert(channel.to_string(), to);
        self.summary.baud_changes.push(BaudChange {
            packet_index,
            channel: channel.to_string(),
            from,
            to,
        });
    }

    pub(crate) fn into_summary(self) -> DecodeSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::SessionCounters;
    use crate::capture::Bus;
    use crate::decoder::DecodeOutcome;

    #[test]
    fn counts_per_bus_and_malformed() {
        let mut counters = SessionCounters::default();
        counters.add_packet(Bus::Uart);
        counters.add_packet(Bus::Spi);
        counters.add_packet(Bus::Spi);
        counters.add_outcome(DecodeOutcome::Malformed);
        counters.add_outcome(DecodeOutcome::Decoded);
        let summary = counters.into_summary();
        assert_eq!(summary.packets_total, 3);
        assert_eq!(summary.uart_packets, 1);
        assert_eq!(summary.spi_packets, 2);
        assert_eq!(summary.i2c_packets, 0);
        assert_eq!(summary.malformed_packets, 1);
    }

    #[test]
    fn baud_change_sticks_to_channel() {
        let mut counters = SessionCounters::default();
        counters.add_baud_change(4, "CARD", 9600, 223_200);
        assert_eq!(counters.baud_override("CARD"), Some(223_200));
        assert_eq!(counters.baud_override("PINPAD"), None);
        assert_eq!(counters.into_summary().baud_changes.len(), 1);
    }
}
