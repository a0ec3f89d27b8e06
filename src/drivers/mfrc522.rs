//! MFRC522 13.56 MHz reader driver (ISO 14443A) over `embedded-hal` SPI.
//!
//! Only what the lock needs: wake a card with REQA, walk the
//! anticollision cascade (4, 7 or 10 byte UIDs), SELECT each level,
//! then HLTA so the same card stays quiet until it leaves the field.
//!
//! ```text
//!  REQA ──▶ ATQA
//!  SEL CLn + NVB 0x20 ──▶ 4 UID bytes + BCC      (n = 1..3)
//!  SEL CLn + NVB 0x70 + UID + BCC + CRC_A ──▶ SAK (bit 2 set: next level)
//!  HLTA + CRC_A ──▶ (silence)
//! ```
//!
//! Collisions are not resolved: with two cards in the field the frame
//! comes back with a collision error and the poll reports no card.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};
use heapless::Vec;
use log::{debug, info};

use crate::credential::{CredentialId, MAX_UID_LEN};
use crate::error::ReaderError;

// ── Registers ─────────────────────────────────────────────────

mod reg {
    pub const COMMAND: u8 = 0x01;
    pub const COM_IRQ: u8 = 0x04;
    pub const ERROR: u8 = 0x06;
    pub const FIFO_DATA: u8 = 0x09;
    pub const FIFO_LEVEL: u8 = 0x0A;
    pub const CONTROL: u8 = 0x0C;
    pub const BIT_FRAMING: u8 = 0x0D;
    pub const COLL: u8 = 0x0E;
    pub const MODE: u8 = 0x11;
    pub const TX_MODE: u8 = 0x12;
    pub const RX_MODE: u8 = 0x13;
    pub const TX_CONTROL: u8 = 0x14;
    pub const TX_ASK: u8 = 0x15;
    pub const MOD_WIDTH: u8 = 0x24;
    pub const T_MODE: u8 = 0x2A;
    pub const T_PRESCALER: u8 = 0x2B;
    pub const T_RELOAD_H: u8 = 0x2C;
    pub const T_RELOAD_L: u8 = 0x2D;
    pub const VERSION: u8 = 0x37;
}

mod cmd {
    pub const IDLE: u8 = 0x00;
    pub const TRANSCEIVE: u8 = 0x0C;
    pub const SOFT_RESET: u8 = 0x0F;
}

// ComIrqReg bits
const IRQ_TIMER: u8 = 0x01;
const IRQ_IDLE: u8 = 0x10;
const IRQ_RX: u8 = 0x20;

// ErrorReg bits
const ERR_COLLISION: u8 = 0x08;
/// BufferOvfl | ParityErr | ProtocolErr
const ERR_FATAL: u8 = 0x13;

// ── PICC commands ─────────────────────────────────────────────

const PICC_REQA: u8 = 0x26;
const PICC_HLTA: u8 = 0x50;
const CASCADE_SELECT: [u8; 3] = [0x93, 0x95, 0x97];
const NVB_ANTICOLL: u8 = 0x20;
const NVB_SELECT: u8 = 0x70;
/// First byte of a level that continues in the next cascade level.
pub const CASCADE_TAG: u8 = 0x88;
/// SAK bit: UID not complete yet.
pub const SAK_CASCADE: u8 = 0x04;

/// ComIrq polls before a transceive is abandoned.  The chip timer
/// (25 ms) fires long before this runs out.
const MAX_IRQ_POLLS: u16 = 2_000;

const FIFO_CAP: usize = 16;

/// CRC_A as defined by ISO/IEC 14443-3 (init 0x6363, reflected
/// polynomial 0x8408), returned low byte first as sent on air.
pub fn crc_a(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0x6363;
    for &byte in data {
        let mut ch = byte ^ (crc as u8);
        ch ^= ch << 4;
        let ch = u16::from(ch);
        crc = (crc >> 8) ^ (ch << 8) ^ (ch << 3) ^ (ch >> 4);
    }
    crc.to_le_bytes()
}

/// Block check character: XOR of the four UID bytes of one level.
pub fn bcc(uid_part: &[u8; 4]) -> u8 {
    uid_part.iter().fold(0, |acc, b| acc ^ b)
}

/// UID bytes contributed by one cascade level given its SAK.
pub fn uid_fragment(level: &[u8; 4], sak: u8) -> Result<&[u8], ReaderError> {
    if sak & SAK_CASCADE != 0 {
        if level[0] != CASCADE_TAG {
            return Err(ReaderError::Protocol);
        }
        Ok(&level[1..])
    } else {
        Ok(&level[..])
    }
}

pub struct Mfrc522<SPI, RST> {
    spi: SPI,
    rst: RST,
}

impl<SPI: SpiDevice, RST: OutputPin> Mfrc522<SPI, RST> {
    pub fn new(spi: SPI, rst: RST) -> Self {
        Self { spi, rst }
    }

    /// Release reset, soft-reset the chip and set up timer, modulation
    /// and antenna.  Returns the chip version byte.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<u8, ReaderError> {
        self.rst.set_high().map_err(|_| ReaderError::Bus)?;
        delay.delay_ms(50);

        self.write(reg::COMMAND, cmd::SOFT_RESET)?;
        delay.delay_ms(50);

        self.write(reg::TX_MODE, 0x00)?;
        self.write(reg::RX_MODE, 0x00)?;
        self.write(reg::MOD_WIDTH, 0x26)?;
        // Timer: auto-start, 40 kHz tick, 1000 ticks = 25 ms receive timeout
        self.write(reg::T_MODE, 0x80)?;
        self.write(reg::T_PRESCALER, 0xA9)?;
        self.write(reg::T_RELOAD_H, 0x03)?;
        self.write(reg::T_RELOAD_L, 0xE8)?;
        // 100 % ASK, CRC preset 0x6363
        self.write(reg::TX_ASK, 0x40)?;
        self.write(reg::MODE, 0x3D)?;
        self.set_bits(reg::TX_CONTROL, 0x03)?;

        let version = self.read(reg::VERSION)?;
        if version == 0x00 || version == 0xFF {
            return Err(ReaderError::Chip);
        }
        info!("MFRC522: version 0x{:02X}", version);
        Ok(version)
    }

    /// Wake a card in the field (REQA).  `NoCard` when nothing answers.
    pub fn request_a(&mut self) -> Result<[u8; 2], ReaderError> {
        self.write(reg::BIT_FRAMING, 0x00)?;
        let (atqa, _) = self.transceive(&[PICC_REQA], 7)?;
        match atqa.as_slice() {
            [a, b] => Ok([*a, *b]),
            _ => Err(ReaderError::Protocol),
        }
    }

    /// Run the cascade for the card woken by [`request_a`](Self::request_a).
    pub fn read_uid(&mut self) -> Result<CredentialId, ReaderError> {
        let mut uid: Vec<u8, MAX_UID_LEN> = Vec::new();
        for sel in CASCADE_SELECT {
            let level = self.anticollision(sel)?;
            let sak = self.select(sel, &level)?;
            let fragment = uid_fragment(&level, sak)?;
            uid.extend_from_slice(fragment).map_err(|_| ReaderError::Protocol)?;
            if sak & SAK_CASCADE == 0 {
                return CredentialId::from_bytes(&uid).map_err(|_| ReaderError::Protocol);
            }
        }
        Err(ReaderError::Protocol)
    }

    /// Put the selected card to sleep (HLTA).  A halted card does not
    /// answer, so silence is success.
    pub fn halt(&mut self) -> Result<(), ReaderError> {
        let mut frame = [PICC_HLTA, 0x00, 0, 0];
        let crc = crc_a(&frame[..2]);
        frame[2..].copy_from_slice(&crc);
        match self.transceive(&frame, 0) {
            Err(ReaderError::NoCard) => Ok(()),
            Ok(_) => Err(ReaderError::Protocol),
            Err(e) => Err(e),
        }
    }

    // ── PICC helpers ──────────────────────────────────────────

    fn anticollision(&mut self, sel: u8) -> Result<[u8; 4], ReaderError> {
        self.write(reg::COLL, 0x80)?;
        let (resp, _) = self.transceive(&[sel, NVB_ANTICOLL], 0)?;
        let [u0, u1, u2, u3, check] = resp.as_slice() else {
            return Err(ReaderError::Protocol);
        };
        let level = [*u0, *u1, *u2, *u3];
        if bcc(&level) != *check {
            debug!("MFRC522: BCC mismatch at level 0x{:02X}", sel);
            return Err(ReaderError::Protocol);
        }
        Ok(level)
    }

    fn select(&mut self, sel: u8, level: &[u8; 4]) -> Result<u8, ReaderError> {
        let mut frame = [0u8; 9];
        frame[0] = sel;
        frame[1] = NVB_SELECT;
        frame[2..6].copy_from_slice(level);
        frame[6] = bcc(level);
        let crc = crc_a(&frame[..7]);
        frame[7..].copy_from_slice(&crc);

        let (resp, _) = self.transceive(&frame, 0)?;
        let [sak, crc_lo, crc_hi] = resp.as_slice() else {
            return Err(ReaderError::Protocol);
        };
        if crc_a(&[*sak]) != [*crc_lo, *crc_hi] {
            return Err(ReaderError::Protocol);
        }
        Ok(*sak)
    }

    /// Send `data` and collect the answer.  `tx_last_bits` is the number
    /// of valid bits in the last sent byte (0 = all 8).  Returns the FIFO
    /// contents and the number of valid bits in the last received byte.
    fn transceive(
        &mut self,
        data: &[u8],
        tx_last_bits: u8,
    ) -> Result<(Vec<u8, FIFO_CAP>, u8), ReaderError> {
        self.write(reg::COMMAND, cmd::IDLE)?;
        self.write(reg::COM_IRQ, 0x7F)?;
        self.write(reg::FIFO_LEVEL, 0x80)?;
        for &b in data {
            self.write(reg::FIFO_DATA, b)?;
        }
        self.write(reg::BIT_FRAMING, tx_last_bits & 0x07)?;
        self.write(reg::COMMAND, cmd::TRANSCEIVE)?;
        self.set_bits(reg::BIT_FRAMING, 0x80)?;

        let mut polls = 0;
        loop {
            let irq = self.read(reg::COM_IRQ)?;
            if irq & (IRQ_RX | IRQ_IDLE) != 0 {
                break;
            }
            if irq & IRQ_TIMER != 0 {
                return Err(ReaderError::NoCard);
            }
            polls += 1;
            if polls >= MAX_IRQ_POLLS {
                return Err(ReaderError::Chip);
            }
        }

        let err = self.read(reg::ERROR)?;
        if err & (ERR_FATAL | ERR_COLLISION) != 0 {
            return Err(ReaderError::Protocol);
        }

        let level = usize::from(self.read(reg::FIFO_LEVEL)?);
        if level > FIFO_CAP {
            return Err(ReaderError::Chip);
        }
        let mut out = Vec::new();
        for _ in 0..level {
            let b = self.read(reg::FIFO_DATA)?;
            out.push(b).map_err(|_| ReaderError::Chip)?;
        }
        let rx_last_bits = self.read(reg::CONTROL)? & 0x07;
        Ok((out, rx_last_bits))
    }

    // ── Register access ───────────────────────────────────────

    fn read(&mut self, reg: u8) -> Result<u8, ReaderError> {
        let mut buf = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[((reg << 1) & 0x7E) | 0x80]),
                Operation::Read(&mut buf),
            ])
            .map_err(|_| ReaderError::Bus)?;
        Ok(buf[0])
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), ReaderError> {
        self.spi
            .write(&[(reg << 1) & 0x7E, value])
            .map_err(|_| ReaderError::Bus)
    }

    fn set_bits(&mut self, reg: u8, mask: u8) -> Result<(), ReaderError> {
        let v = self.read(reg)?;
        self.write(reg, v | mask)
    }
}
