//! Data models
//!
//! Records mirrored from the backend REST API, the choice lists they use,
//! and the form inputs submitted by visitors and administrators.
//! Field names are English; serde renames map them to the backend's French
//! wire names.

mod annonce;
mod choice;
mod documentation;
mod evenement;
mod expert;
mod form;
mod publicite;
mod session;
mod user;
pub mod wire;

pub use annonce::{Annonce, AnnonceCategory, AnnonceForm};
pub use choice::ChoiceOption;
pub use documentation::{DocumentCategory, Documentation, DocumentationForm};
pub use evenement::{EventCategory, EventTag, Evenement, EvenementForm};
pub use expert::{Expert, ExpertService};
pub use form::{FieldError, FormFields, UploadKind, UploadedFile};
pub use publicite::{Publicite, PubliciteForm};
pub use session::Session;
pub use user::{LoginForm, NewUser, Role, SignupForm, SignupPayload, UserInfo};
