/*!
Command dispatcher module.

Layout:
  src/cmd/
    mod.rs       (this file)
    auth.rs      (register / login / logout)
    get.rs       (get group)
    put.rs       (put config)
    validate.rs  (validate schema)
    context.rs   (context init / show / drop)
    shared.rs    (Session, GlobalOpts, document loading)
    output.rs    (OutputFormat, YAML/JSON rendering, saving)
    format.rs    (tables, boxed headers, colour)

Conventions:
  - Each subcommand module exposes one public `execute_*` function that
    returns `anyhow::Result<()>` and receives the parsed args + `GlobalOpts`.
  - The request-building part is a separate `pub(crate)` function taking a
    `Session` so it can be exercised against a local mock server.
*/

pub mod auth;
pub mod context;
pub mod format;
pub mod get;
pub mod output;
pub mod put;
pub mod shared;
pub mod validate;

pub use auth::{LoginArgs, RegisterArgs, execute_login, execute_logout, execute_register};
pub use context::{ContextCommand, execute_context};
pub use get::{GetCommand, execute_get};
pub use put::{PutCommand, execute_put};
pub use shared::GlobalOpts;
pub use validate::{ValidateCommand, execute_validate};
