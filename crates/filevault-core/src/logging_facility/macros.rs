//! Canonical logging macros
//!
//! `log_op_*` frame one operation; `log_meta_failure!` is the single trace
//! left by a metadata write that was dropped instead of returned.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use filevault_core::log_op_start;
/// log_op_start!("add_file");
/// log_op_start!("add_file", record_id = "r123");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = filevault_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = filevault_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use filevault_core::log_op_end;
/// log_op_end!("add_file", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = filevault_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = filevault_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into `ExError`.
///
/// # Example
///
/// ```
/// # use filevault_core::log_op_error;
/// # use filevault_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::StorageFailure);
/// log_op_error!("add_file", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = filevault_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = filevault_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err,
            $($field)*
        );
    }};
}

/// Log a swallowed metadata failure for one record
///
/// Always reported as `ERR_METADATA_WRITE_FAILURE`, whatever caused it; the
/// cause is kept in the `error` field.
///
/// # Example
///
/// ```
/// # use filevault_core::log_meta_failure;
/// # use filevault_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::StorageFailure).with_message("disk full");
/// log_meta_failure!("r1", err, "Failed to store meta file");
/// ```
#[macro_export]
macro_rules! log_meta_failure {
    ($record_id:expr, $err:expr, $msg:literal) => {{
        use $crate::errors::{ExError, ExErrorKind};
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            record_id = %$record_id,
            err_kind = ?ExErrorKind::MetadataWriteFailure,
            err_code = ExErrorKind::MetadataWriteFailure.code(),
            error = %ex_err,
            $msg
        );
    }};
}
