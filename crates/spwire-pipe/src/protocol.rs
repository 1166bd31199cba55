//! Standard SP protocol numbers.
//!
//! A protocol number is `(family << 4) | role`. The pipe only carries these
//! numbers; deciding whether two of them may talk is up to the socket layer.

/// One-to-one pair.
pub const PAIR: u16 = 0x10;
/// Publisher.
pub const PUB: u16 = 0x20;
/// Subscriber.
pub const SUB: u16 = 0x21;
/// Requester.
pub const REQ: u16 = 0x30;
/// Replier.
pub const REP: u16 = 0x31;
/// Pipeline sender.
pub const PUSH: u16 = 0x50;
/// Pipeline receiver.
pub const PULL: u16 = 0x51;
/// Survey initiator.
pub const SURVEYOR: u16 = 0x62;
/// Survey responder.
pub const RESPONDENT: u16 = 0x63;
/// Many-to-many bus.
pub const BUS: u16 = 0x70;

const NAMES: [(u16, &str); 10] = [
    (PAIR, "pair"),
    (PUB, "pub"),
    (SUB, "sub"),
    (REQ, "req"),
    (REP, "rep"),
    (PUSH, "push"),
    (PULL, "pull"),
    (SURVEYOR, "surveyor"),
    (RESPONDENT, "respondent"),
    (BUS, "bus"),
];

/// Returns a human-readable name for a protocol number.
pub fn protocol_name(proto: u16) -> &'static str {
    NAMES
        .iter()
        .find(|(num, _)| *num == proto)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}

/// Parse a protocol given by name (`"req"`), decimal (`"48"`) or hex (`"0x30"`).
pub fn parse_protocol(input: &str) -> Option<u16> {
    let input = input.trim();
    if let Some((num, _)) = NAMES
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(input))
    {
        return Some(*num);
    }
    if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        return u16::from_str_radix(hex, 16).ok();
    }
    input.parse().ok()
}

/// The protocol a well-behaved peer of `proto` announces.
pub fn peer_protocol(proto: u16) -> Option<u16> {
    match proto {
        PAIR => Some(PAIR),
        PUB => Some(SUB),
        SUB => Some(PUB),
        REQ => Some(REP),
        REP => Some(REQ),
        PUSH => Some(PULL),
        PULL => Some(PUSH),
        SURVEYOR => Some(RESPONDENT),
        RESPONDENT => Some(SURVEYOR),
        BUS => Some(BUS),
        _ => None,
    }
}

/// Returns true if `remote` is the expected peer of `local`.
pub fn is_compatible(local: u16, remote: u16) -> bool {
    peer_protocol(local) == Some(remote)
}
