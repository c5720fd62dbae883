//! Scene runtime for the sandbox canvas.
//!
//! The crate owns everything between the external logic engine and the
//! pixels: the engine drives it with a stream of commands that define,
//! update and animate objects, and the scene reports pointer input back as
//! batches of ground literals. Nothing here performs I/O. Callers feed
//! commands and timestamps in and act on the returned [`engine::Effect`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::SceneCore`] dispatcher and the browser-bound [`engine::Scene`] |
//! | [`command`] | Typed engine commands and outbound engine requests |
//! | [`object`] | Polymorphic canvas objects (circle, text, image) |
//! | [`animation`] | Time-bounded property interpolation |
//! | [`order`] | Pluggable render-order policies |
//! | [`registry`] | Engine identifier to object mapping |
//! | [`doc`] | Object arena, drawable sequence and registry, reset atomically |
//! | [`hit`] | Registry-order hit-testing |
//! | [`images`] | Browser image-load bookkeeping and the load barrier |
//! | [`lifecycle`] | Run lifecycle state machine |
//! | [`stats`] | Sliding-window run statistics |
//! | [`input`] | Pointer event types and button tracking |
//! | [`translate`] | Pointer event to observation literal translation |
//! | [`render`] | Drawing surfaces (display list and 2D context) |
//! | [`geom`] | Points and vector helpers |
//! | [`error`] | Scene-level error taxonomy |
//! | [`consts`] | Shared constants |

pub mod animation;
pub mod command;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geom;
pub mod hit;
pub mod images;
pub mod input;
pub mod lifecycle;
pub mod object;
pub mod order;
pub mod registry;
pub mod render;
pub mod stats;
pub mod translate;
