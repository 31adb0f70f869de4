pub(crate) use crate::endpoint::Endpoint;
pub(crate) use anyhow::Context;
pub(crate) use tokio::io::{AsyncReadExt, AsyncWriteExt};
pub(crate) use tracing::{debug, info, warn};
