pub const PACKET_HEADER_LEN: usize = 4;

pub const MSG_PING: u16 = 0;
pub const MSG_PING_RESPONSE: u16 = 1;
pub const MSG_REQUEST: u16 = 2;
pub const MSG_RESPONSE: u16 = 3;
pub const MSG_REQUEST_MODELDEF: u16 = 4;
pub const MSG_MODELDEF: u16 = 5;
pub const MSG_REQUEST_FRAMEOFDATA: u16 = 6;
pub const MSG_FRAMEOFDATA: u16 = 7;
pub const MSG_MESSAGESTRING: u16 = 8;
pub const MSG_UNRECOGNIZED_REQUEST: u16 = 100;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_PACKET_SIZE: usize = 100_000;

pub const POINT3_LEN: usize = 12;
pub const QUATERNION_LEN: usize = 16;
pub const COUNT_LEN: usize = 4;

pub const SENDER_PAYLOAD_LEN: usize = MAX_NAME_LEN + 4 + 4;
pub const RIGID_BODY_FIXED_LEN: usize = 4 + POINT3_LEN + QUATERNION_LEN;

// Minimal wire footprint of one element of each count-prefixed list; used to
// reject implausible counts before any allocation.
pub const MARKER_SET_MIN_LEN: usize = 1 + COUNT_LEN;
pub const RIGID_BODY_MIN_LEN: usize = RIGID_BODY_FIXED_LEN + COUNT_LEN;
pub const SKELETON_MIN_LEN: usize = 1 + COUNT_LEN;
pub const LABELED_MARKER_MIN_LEN: usize = 4 + POINT3_LEN;

// Protocol version thresholds for optional field groups.
pub const VERSION_RIGID_BODY_METADATA: (u8, u8) = (2, 0);
pub const VERSION_SKELETONS: (u8, u8) = (2, 1);
pub const VERSION_LABELED_MARKERS: (u8, u8) = (2, 3);
