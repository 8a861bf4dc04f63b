//! Shared Tokio runtime helper for tests that mock HTTP services.
//!
//! The store and advisor clients are blocking, so mock servers are started on
//! a runtime owned by the test while requests run on the test thread.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tokio::runtime::Runtime;
use wiremock::MockServer;

/// Shared runtime wrapper that can be stored in an `rstest-bdd` slot.
#[derive(Clone)]
pub struct SharedRuntime(Rc<RefCell<Runtime>>);

impl SharedRuntime {
    pub fn new(runtime: Runtime) -> Self {
        Self(Rc::new(RefCell::new(runtime)))
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.0.borrow().block_on(future)
    }
}

/// Starts a runtime and a mock server on it.
///
/// The runtime must outlive every request made to the server.
///
/// # Errors
///
/// Returns an error if the Tokio runtime cannot be created.
pub fn start_mock_server() -> Result<(SharedRuntime, MockServer), io::Error> {
    let runtime = SharedRuntime::new(Runtime::new()?);
    let server = runtime.block_on(MockServer::start());
    Ok((runtime, server))
}
