//! RFID reader adapter.
//!
//! Implements [`CredentialReaderPort`] on top of the MFRC522 driver.
//! "No card" is the normal outcome of a poll and is silent; every other
//! reader fault is logged at debug level and also reported as no card.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::debug;

use crate::app::ports::CredentialReaderPort;
use crate::credential::CredentialId;
use crate::drivers::mfrc522::Mfrc522;
use crate::error::ReaderError;

pub struct RfidReader<SPI, RST> {
    chip: Mfrc522<SPI, RST>,
}

impl<SPI: SpiDevice, RST: OutputPin> RfidReader<SPI, RST> {
    /// Wrap an already initialised chip.
    pub fn new(chip: Mfrc522<SPI, RST>) -> Self {
        Self { chip }
    }

    fn poll(&mut self) -> Result<CredentialId, ReaderError> {
        self.chip.request_a()?;
        let id = self.chip.read_uid()?;
        if let Err(e) = self.chip.halt() {
            debug!("RFID: halt failed: {}", e);
        }
        Ok(id)
    }
}

impl<SPI: SpiDevice, RST: OutputPin> CredentialReaderPort for RfidReader<SPI, RST> {
    fn try_read(&mut self) -> Option<CredentialId> {
        match self.poll() {
            Ok(id) => Some(id),
            Err(ReaderError::NoCard) => None,
            Err(e) => {
                debug!("RFID: poll failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mfrc522::fake::{FakeChip, NoReset, Reply, single_size_card};

    const UID: [u8; 4] = [0x0F, 0xB8, 0xE2, 0x29];

    fn reader(replies: Vec<Reply>) -> (RfidReader<FakeChip, NoReset>, FakeChip) {
        let spi = FakeChip::new(replies);
        (RfidReader::new(Mfrc522::new(spi.clone(), NoReset)), spi)
    }

    #[test]
    fn card_in_field_is_read_and_halted() {
        let (mut rfid, spi) = reader(single_size_card(UID));

        let id = rfid.try_read().expect("card read");
        assert_eq!(id, "0F B8 E2 29".parse().unwrap());

        let sent = spi.sent();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent.last(), Some(&vec![0x50, 0x00, 0x57, 0xCD]));
    }

    #[test]
    fn halted_card_is_not_read_again() {
        let (mut rfid, _spi) = reader(single_size_card(UID));
        assert!(rfid.try_read().is_some());
        // Halted card stays silent on the next REQA.
        assert_eq!(rfid.try_read(), None);
    }

    #[test]
    fn empty_field_reads_nothing() {
        let (mut rfid, spi) = reader(vec![Reply::Silence]);
        assert_eq!(rfid.try_read(), None);
        assert_eq!(spi.sent(), vec![vec![0x26]]);
    }

    #[test]
    fn garbled_uid_reads_nothing_and_skips_halt() {
        let (mut rfid, spi) = reader(vec![
            Reply::Frame(vec![0x04, 0x00]),
            Reply::Frame(vec![UID[0], UID[1], UID[2], UID[3], 0x00]),
        ]);
        assert_eq!(rfid.try_read(), None);
        assert_eq!(spi.sent().len(), 2);
    }
}
