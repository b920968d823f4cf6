pub mod client;
pub mod transmission;

pub use client::{
    ClientStats, ConnectionStats, OutboundRequest, ReqwestTransport, Transport, TransportConfig,
    TransportError, TransportResponse,
};
pub use transmission::{SUMO_CLIENT, TransmissionError, Transmitter};
