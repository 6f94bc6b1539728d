//! NatNet motion-capture protocol decoding.
//!
//! The parser reads the two-field packet header, then decodes sender
//! announcements and frame-of-data payloads into domain structures. Frame
//! payloads nest variable-length lists whose shape depends on the negotiated
//! protocol version; gated field groups are decoded or skipped wholesale so
//! the cursor never desynchronizes. Counts are validated against the
//! remaining payload before allocation.
//!
//! Errors are explicit and actionable (truncated payload, unknown or
//! unimplemented message type). Wire constants live in `layout`, version
//! thresholds in `version`, and safe cursor reads in `reader`.
//!
//! Version française (résumé):
//! Le module décode le protocole NatNet (annonces d'émetteur et trames de
//! capture de mouvement) avec validations strictes (en-tête, compteurs,
//! groupes de champs conditionnés par version). Les constantes sont dans
//! `layout`, les seuils de version dans `version`, les lectures dans
//! `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod version;

pub use error::NatNetError;
pub use parser::{
    DecodedPacket, FrameOfData, LabeledMarker, MarkerSet, Point3, Quaternion, RigidBody,
    SenderDescriptor, Skeleton, Timecode, decode,
};
pub use version::{ParseVersionError, ProtocolVersion};
