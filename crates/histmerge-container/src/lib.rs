//! Histogram containers for histmerge
//!
//! A container file holds an ordered list of top-level groups, each holding
//! an ordered list of named [`Histogram`] records. Histograms support an
//! additive merge primitive ([`Histogram::add`]).
//!
//! Loading a container through a [`ContainerStore`] produces fully owned
//! values: records taken out of a [`Container`] stay valid after the container
//! is dropped.

pub mod container;
pub mod error;
pub mod histogram;
pub mod store;

pub use container::{Container, Group};
pub use error::{Error, Result};
pub use histogram::{Axis, Histogram};
pub use store::{ContainerStore, JsonStore};
