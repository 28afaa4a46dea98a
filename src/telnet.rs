//! A minimal IAC (Interpret As Command) state machine for the telnet wire
//! protocol: option negotiation and escaping only, no terminal emulation.
//!
//! This is the "terminal control-sequence protocol" external collaborator from
//! the design — the session hands it raw bytes from the socket and gets back
//! application data plus any negotiation replies to send. It does not attempt
//! full RFC 854/855 coverage: subnegotiation payloads (e.g. NAWS dimensions)
//! are consumed and discarded rather than interpreted.

const IAC: u8 = 255;
const WILL: u8 = 251;
const WONT: u8 = 252;
const DO: u8 = 253;
const DONT: u8 = 254;
const SB: u8 = 250;
const SE: u8 = 240;

pub mod option {
    pub const BINARY: u8 = 0;
    pub const ECHO: u8 = 1;
    pub const SGA: u8 = 3;
    pub const NAWS: u8 = 31;
    pub const MSSP: u8 = 70;
    pub const COMPRESS2: u8 = 86;
    pub const ZMP: u8 = 93;
}

/// Options we are willing to enable on our own side.
const OFFERED: [u8; 4] = [option::ECHO, option::SGA, option::BINARY, option::NAWS];
/// Options we categorically refuse, regardless of what the peer asks for.
const REFUSED: [u8; 3] = [option::COMPRESS2, option::ZMP, option::MSSP];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    Negotiate(u8),
    SubNegotiate,
    SubNegotiateIac,
}

/// What came out of feeding bytes to the protocol.
#[derive(Debug, Default)]
pub struct Processed {
    /// Application (non-protocol) bytes to hand to the CLI input device.
    pub application_data: Vec<u8>,
    /// Protocol bytes to write back to the peer (negotiation replies).
    pub reply: Vec<u8>,
}

/// Per-connection telnet negotiation state.
pub struct TelnetProtocol {
    state: State,
}

impl TelnetProtocol {
    pub fn new() -> Self {
        TelnetProtocol { state: State::Data }
    }

    /// The negotiation bytes to send immediately after accept, before the CLI banner.
    pub fn initial_negotiation(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for &opt in &OFFERED {
            out.extend_from_slice(&[IAC, WILL, opt]);
        }
        for &opt in &REFUSED {
            out.extend_from_slice(&[IAC, WONT, opt]);
        }
        out
    }

    /// Feeds raw bytes read from the socket, separating application data from
    /// protocol traffic and producing any negotiation replies.
    pub fn process(&mut self, input: &[u8]) -> Processed {
        let mut out = Processed::default();

        for &byte in input {
            match self.state {
                State::Data => {
                    if byte == IAC {
                        self.state = State::Iac;
                    } else {
                        out.application_data.push(byte);
                    }
                }
                State::Iac => match byte {
                    IAC => {
                        out.application_data.push(IAC);
                        self.state = State::Data;
                    }
                    WILL | WONT | DO | DONT => self.state = State::Negotiate(byte),
                    SB => self.state = State::SubNegotiate,
                    _ => self.state = State::Data, // NOP, GA, and friends: no payload, nothing to do
                },
                State::Negotiate(cmd) => {
                    self.reply_to(cmd, byte, &mut out.reply);
                    self.state = State::Data;
                }
                State::SubNegotiate => {
                    if byte == IAC {
                        self.state = State::SubNegotiateIac;
                    }
                    // subnegotiation payload (e.g. NAWS width/height) is discarded
                }
                State::SubNegotiateIac => {
                    self.state = if byte == SE { State::Data } else { State::SubNegotiate };
                }
            }
        }

        out
    }

    fn reply_to(&self, cmd: u8, option: u8, reply: &mut Vec<u8>) {
        match cmd {
            DO => {
                if OFFERED.contains(&option) {
                    reply.extend_from_slice(&[IAC, WILL, option]);
                } else {
                    reply.extend_from_slice(&[IAC, WONT, option]);
                }
            }
            DONT => reply.extend_from_slice(&[IAC, WONT, option]),
            WILL => {
                if REFUSED.contains(&option) {
                    reply.extend_from_slice(&[IAC, DONT, option]);
                } else {
                    reply.extend_from_slice(&[IAC, DO, option]);
                }
            }
            WONT => reply.extend_from_slice(&[IAC, DONT, option]),
            _ => {}
        }
    }
}

impl Default for TelnetProtocol {
    fn default() -> Self {
        Self::new()
    }
}
