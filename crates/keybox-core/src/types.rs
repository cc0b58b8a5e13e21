use crate::{
    Result,
    constants::{EVENT_TYPE_RETURN, EVENT_TYPE_TAKE, MAX_TAG_ID_LENGTH, MIN_TAG_ID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Radio tag identifier (1-32 printable ASCII characters, uppercase)
///
/// # Security
/// Tags are credentials, so comparison runs in constant time.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Create a new tag id with validation.
    ///
    /// The id is normalized (trimmed and converted to uppercase) before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if:
    /// - The id length is not between 1-32 characters
    /// - The id contains non-printable or non-ASCII characters
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_uppercase();

        let len = id.len();
        if !(MIN_TAG_ID_LENGTH..=MAX_TAG_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidTagId(format!(
                "Tag id must be {MIN_TAG_ID_LENGTH}-{MAX_TAG_ID_LENGTH} chars, got {len}"
            )));
        }

        if !id.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::InvalidTagId(format!(
                "Tag id must be printable ASCII: {id:?}"
            )));
        }

        Ok(TagId(id))
    }

    /// Build a tag id from raw UID bytes, two uppercase hex digits per byte.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if the UID is empty or renders longer
    /// than the maximum tag id length.
    ///
    /// # Examples
    /// ```
    /// use keybox_core::TagId;
    ///
    /// let tag = TagId::from_uid_bytes(&[0x04, 0xAB, 0xCD, 0xEF]).unwrap();
    /// assert_eq!(tag.as_str(), "04ABCDEF");
    /// ```
    pub fn from_uid_bytes(uid: &[u8]) -> Result<Self> {
        let hex: String = uid.iter().map(|b| format!("{b:02X}")).collect();
        TagId::new(&hex)
    }

    /// Get the tag id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::new(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::new(&value)
    }
}

impl From<TagId> for String {
    fn from(tag: TagId) -> Self {
        tag.0
    }
}

/// Constant-time comparison implementation for TagId
impl PartialEq for TagId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for TagId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Locally cached belief about the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    Available,
    Taken,
}

impl KeyState {
    /// Map the server's `keyTaken` flag to a key state.
    #[inline]
    #[must_use]
    pub fn from_taken(taken: bool) -> Self {
        if taken {
            KeyState::Taken
        } else {
            KeyState::Available
        }
    }

    /// Returns `true` if the key is checked out.
    #[inline]
    #[must_use]
    pub fn is_taken(self) -> bool {
        matches!(self, KeyState::Taken)
    }

    /// The state after a custody transition.
    #[inline]
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            KeyState::Available => KeyState::Taken,
            KeyState::Taken => KeyState::Available,
        }
    }

    /// The event a tap produces while the key is in this state.
    ///
    /// # Examples
    /// ```
    /// use keybox_core::{EventType, KeyState};
    ///
    /// assert_eq!(KeyState::Available.next_event(), EventType::Take);
    /// assert_eq!(KeyState::Taken.next_event(), EventType::Return);
    /// ```
    #[inline]
    #[must_use]
    pub fn next_event(self) -> EventType {
        match self {
            KeyState::Available => EventType::Take,
            KeyState::Taken => EventType::Return,
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyState::Available => write!(f, "AVAILABLE"),
            KeyState::Taken => write!(f, "TAKEN"),
        }
    }
}

/// Key custody transition reported to the authority server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Take,
    Return,
}

impl EventType {
    /// Wire value understood by the server (`"take"` / `"return"`).
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Take => EVENT_TYPE_TAKE,
            EventType::Return => EVENT_TYPE_RETURN,
        }
    }

    /// Key state once the server has accepted this event.
    #[inline]
    #[must_use]
    pub fn resulting_state(self) -> KeyState {
        match self {
            EventType::Take => KeyState::Taken,
            EventType::Return => KeyState::Available,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            EVENT_TYPE_TAKE => Ok(EventType::Take),
            EVENT_TYPE_RETURN => Ok(EventType::Return),
            other => Err(Error::InvalidEventType(other.to_string())),
        }
    }
}

/// A debounced tap turned into a custody event.
///
/// Built by the reconciliation engine, handed to the status client by
/// reference, then dropped. The `id` only correlates log lines and is never
/// sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    id: Uuid,
    tag_id: TagId,
    event_type: EventType,
    timestamp: Instant,
}

impl TagEvent {
    pub fn new(tag_id: TagId, event_type: EventType, timestamp: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag_id,
            event_type,
            timestamp,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn tag_id(&self) -> &TagId {
        &self.tag_id
    }

    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    #[must_use]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

/// Device identifier sent to the server as-is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new device id.
    ///
    /// # Errors
    /// Returns `Error::InvalidDeviceId` if the id is blank or not a valid
    /// header value (printable ASCII).
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidDeviceId("Device id cannot be empty".to_string()));
        }
        if !id.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::InvalidDeviceId(format!(
                "Device id must be printable ASCII: {id:?}"
            )));
        }
        Ok(DeviceId(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        DeviceId::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

/// Opaque device credential
///
/// `Debug` is redacted so the key never reaches a log line.
#[derive(Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap an API key.
    ///
    /// # Errors
    /// Returns `Error::InvalidApiKey` if the key is blank or not a valid
    /// header value (printable ASCII).
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::InvalidApiKey("API key cannot be empty".to_string()));
        }
        if !key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::InvalidApiKey(
                "API key must be printable ASCII".to_string(),
            ));
        }
        Ok(ApiKey(key))
    }

    /// Raw key, for building the request header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl TryFrom<String> for ApiKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        ApiKey::new(value)
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AB12", "AB12")]
    #[case("ab12", "AB12")]
    #[case("  04abcdef ", "04ABCDEF")]
    #[case("12345678901234567890", "12345678901234567890")]
    fn test_tag_id_valid(#[case] input: &str, #[case] expected: &str) {
        let tag = TagId::new(input).unwrap();
        assert_eq!(tag.as_str(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("   ")] // blank
    #[case("123456789012345678901234567890123")] // too long
    #[case("AB 12")] // inner whitespace
    #[case("AB\u{7}")] // control character
    #[case("ÁB12")] // non-ASCII
    fn test_tag_id_invalid(#[case] input: &str) {
        let result = TagId::new(input);
        assert!(matches!(result, Err(Error::InvalidTagId(_))));
    }

    #[test]
    fn test_tag_id_from_uid_bytes() {
        let tag = TagId::from_uid_bytes(&[0x04, 0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(tag.as_str(), "04ABCDEF");

        let tag = TagId::from_uid_bytes(&[0x00, 0x0A]).unwrap();
        assert_eq!(tag.as_str(), "000A");
    }

    #[test]
    fn test_tag_id_from_empty_uid() {
        assert!(TagId::from_uid_bytes(&[]).is_err());
    }

    #[test]
    fn test_tag_id_equality_is_case_insensitive_input() {
        let a = TagId::new("cd34").unwrap();
        let b: TagId = "CD34".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, TagId::new("CD35").unwrap());
    }

    #[test]
    fn test_tag_id_serde_validates() {
        let tag: TagId = serde_json::from_str("\"ab12\"").unwrap();
        assert_eq!(tag.as_str(), "AB12");
        assert!(serde_json::from_str::<TagId>("\"\"").is_err());
    }

    #[rstest]
    #[case(KeyState::Available, EventType::Take)]
    #[case(KeyState::Taken, EventType::Return)]
    fn test_key_state_next_event(#[case] state: KeyState, #[case] expected: EventType) {
        assert_eq!(state.next_event(), expected);
        assert_eq!(expected.resulting_state(), state.flipped());
    }

    #[test]
    fn test_key_state_from_taken() {
        assert_eq!(KeyState::from_taken(true), KeyState::Taken);
        assert_eq!(KeyState::from_taken(false), KeyState::Available);
        assert!(KeyState::Taken.is_taken());
        assert!(!KeyState::Available.is_taken());
    }

    #[rstest]
    #[case(EventType::Take, "take")]
    #[case(EventType::Return, "return")]
    fn test_event_type_wire_value(#[case] event: EventType, #[case] wire: &str) {
        assert_eq!(event.as_str(), wire);
        assert_eq!(event.to_string(), wire);
        assert_eq!(serde_json::to_string(&event).unwrap(), format!("\"{wire}\""));
        assert_eq!(wire.parse::<EventType>().unwrap(), event);
    }

    #[rstest]
    #[case("TAKE")]
    #[case("borrow")]
    #[case("")]
    fn test_event_type_invalid(#[case] input: &str) {
        assert!(matches!(
            input.parse::<EventType>(),
            Err(Error::InvalidEventType(_))
        ));
    }

    #[test]
    fn test_tag_event_accessors() {
        let now = Instant::now();
        let tag = TagId::new("AB12").unwrap();
        let event = TagEvent::new(tag.clone(), EventType::Take, now);

        assert_eq!(event.tag_id(), &tag);
        assert_eq!(event.event_type(), EventType::Take);
        assert_eq!(event.timestamp(), now);
    }

    #[test]
    fn test_tag_event_ids_are_unique() {
        let now = Instant::now();
        let tag = TagId::new("AB12").unwrap();
        let a = TagEvent::new(tag.clone(), EventType::Take, now);
        let b = TagEvent::new(tag, EventType::Take, now);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_device_id_validation() {
        assert!(DeviceId::new("esp32-matik-registration").is_ok());
        assert!(DeviceId::new("").is_err());
        assert!(DeviceId::new("with space").is_err());
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
        assert_eq!(key.expose(), "super-secret");
    }

    #[test]
    fn test_api_key_rejects_blank() {
        assert!(matches!(ApiKey::new("  "), Err(Error::InvalidApiKey(_))));
    }
}
