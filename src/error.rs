use crate::network::{BundleBaseId, EdgeId, HubId, SegmentId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BundleError {
    #[error("hub `{0}` is not part of the network")]
    UnknownHub(HubId),
    #[error("bundle base `{0}` is not part of the network")]
    UnknownBase(BundleBaseId),
    #[error("segment `{0}` is not part of the network")]
    UnknownSegment(SegmentId),
    #[error("segment `{0}` is paired with missing segment `{1}`")]
    DanglingOther(SegmentId, SegmentId),
    #[error("segment `{0}` is paired with `{1}`, but `{1}` is not paired back")]
    AsymmetricOther(SegmentId, SegmentId),
    #[error("segment `{segment}` is not listed by its bundle base `{base}` at index {index}")]
    MisplacedSegment {
        segment: SegmentId,
        base: BundleBaseId,
        index: usize,
    },
    #[error("segments `{0}` and `{1}` are paired but are not the two ends of one curve")]
    MismatchedOther(SegmentId, SegmentId),
    #[error("bundle base `{0}` does not index its segments contiguously")]
    BrokenIndexOrder(BundleBaseId),
    #[error("segments `{0}` and `{1}` continue each other but sit at different hubs")]
    BrokenThrough(SegmentId, SegmentId),
    #[error("edge `{0}` has no legs")]
    EmptyEdge(EdgeId),
    #[error("edge `{edge}` is disconnected after leg {leg}")]
    BrokenChain { edge: EdgeId, leg: usize },
    #[error("edge `{edge}` passes through a terminal at leg {leg}")]
    TerminalInsideEdge { edge: EdgeId, leg: usize },
    #[error("leg {leg} of edge `{edge}` is detached from its attachment by {distance}")]
    DetachedCurve {
        edge: EdgeId,
        leg: usize,
        distance: f64,
    },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
