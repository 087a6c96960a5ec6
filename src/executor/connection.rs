/// Per-call connection ownership
///
/// A connection opened for one executor call is closed exactly once after
/// the call's body returns. A close failure is surfaced on the success path
/// and only logged when the body already failed. On a panic the connection
/// is dropped during unwinding, which frees the handle without a close.

use log::{debug, warn};

use crate::core::{DataSourceError, Result};
use crate::driver::{Connection, Driver};

pub(crate) fn with_connection<D, F, R>(
    driver: &D,
    connection_string: &str,
    operation: &'static str,
    body: F,
) -> Result<R>
where
    D: Driver + ?Sized,
    F: FnOnce(&dyn Connection) -> Result<R>,
{
    let connection = driver
        .connect(connection_string)
        .map_err(DataSourceError::provider(operation))?;
    debug!("{operation}: connection opened");

    let result = body(connection.as_ref());

    match (result, connection.close()) {
        (Ok(value), Ok(())) => {
            debug!("{operation}: connection released");
            Ok(value)
        }
        (Ok(_), Err(e)) => Err(DataSourceError::provider(operation)(e)),
        (Err(e), closed) => {
            match closed {
                Ok(()) => debug!("{operation}: connection released after failure"),
                Err(close) => warn!("{operation}: failed to close connection: {close}"),
            }
            Err(e)
        }
    }
}
