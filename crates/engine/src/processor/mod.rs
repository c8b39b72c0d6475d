mod command;
mod router;
mod worker;

pub use command::ProductCommand;
pub use router::ProductRouter;
pub use worker::{ProductWorker, WorkerHandle};
