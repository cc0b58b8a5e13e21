//! Mock tag reader implementation for testing and development.
//!
//! This module provides a simulated tag reader that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    Result,
    traits::{TagRead, TagReader},
    types::ReaderInfo,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Mock tag reader for testing and development.
///
/// Tags presented through the paired [`MockTagReaderHandle`] are queued and
/// returned one per [`try_read_tag`](TagReader::try_read_tag) call. Once every
/// handle is dropped and the queue drained, the reader reports itself
/// disconnected.
///
/// # Examples
///
/// ```
/// use keybox_hardware::mock::MockTagReader;
/// use keybox_hardware::traits::TagReader;
///
/// #[tokio::main]
/// async fn main() -> keybox_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new();
///
///     assert!(reader.try_read_tag().await?.is_none());
///
///     handle.present(vec![0x04, 0xAB, 0xCD, 0xEF]).await?;
///
///     let read = reader.try_read_tag().await?.unwrap();
///     assert_eq!(read.uid_hex(), "04ABCDEF");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    /// Channel receiver for tag events
    event_rx: mpsc::Receiver<TagRead>,

    /// Device name
    name: String,
}

impl MockTagReader {
    /// Create a new mock tag reader with the default name.
    pub fn new() -> (Self, MockTagReaderHandle) {
        Self::with_name("Mock Tag Reader".to_string())
    }

    /// Create a new mock tag reader with a custom name.
    ///
    /// # Examples
    ///
    /// ```
    /// use keybox_hardware::mock::MockTagReader;
    ///
    /// let (reader, handle) = MockTagReader::with_name("Front Desk".to_string());
    /// assert_eq!(handle.name(), "Front Desk");
    /// ```
    pub fn with_name(name: String) -> (Self, MockTagReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            name: name.clone(),
        };

        let handle = MockTagReaderHandle { event_tx, name };

        (reader, handle)
    }

    /// Number of presented tags not yet read.
    pub fn pending(&self) -> usize {
        self.event_rx.len()
    }
}

impl Default for MockTagReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl TagReader for MockTagReader {
    async fn try_read_tag(&mut self) -> Result<Option<TagRead>> {
        match self.event_rx.try_recv() {
            Ok(read) => Ok(Some(read)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(crate::HardwareError::disconnected(self.name.clone()))
            }
        }
    }

    async fn get_reader_info(&self) -> Result<ReaderInfo> {
        Ok(ReaderInfo::new(
            self.name.clone(),
            vec!["ISO14443A".to_string()],
        ))
    }
}

/// Handle for presenting tags to a mock reader.
///
/// Cloning the handle gives another presenter for the same reader.
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    /// Channel sender for tag events
    event_tx: mpsc::Sender<TagRead>,

    /// Device name
    name: String,
}

impl MockTagReaderHandle {
    /// Present a tag with the given UID bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The UID length is invalid
    /// - The reader has been dropped and the channel is closed
    pub async fn present(&self, uid: Vec<u8>) -> Result<()> {
        let read = TagRead::new(uid)?;

        self.event_tx
            .send(read)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Tag event channel closed"))
    }

    /// Present a tag given as a hex string (e.g. `"04ABCDEF"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not an even-length hex string or
    /// the resulting UID is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use keybox_hardware::mock::MockTagReader;
    /// use keybox_hardware::traits::TagReader;
    ///
    /// #[tokio::main]
    /// async fn main() -> keybox_hardware::Result<()> {
    ///     let (mut reader, handle) = MockTagReader::new();
    ///     handle.present_hex("de ad be ef").await?;
    ///
    ///     let read = reader.try_read_tag().await?.unwrap();
    ///     assert_eq!(read.uid, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    ///     Ok(())
    /// }
    /// ```
    pub async fn present_hex(&self, hex: &str) -> Result<()> {
        let uid = parse_hex_uid(hex)?;
        self.present(uid).await
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Parse a hex UID, ignoring whitespace and `:` separators.
fn parse_hex_uid(hex: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = hex
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();

    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(crate::HardwareError::invalid_data(format!(
            "UID hex must have an even number of digits: {hex:?}"
        )));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16).map_err(|_| {
                crate::HardwareError::invalid_data(format!("Invalid hex byte {byte:?} in UID"))
            })
        })
        .collect()
}
