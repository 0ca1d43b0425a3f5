//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `BackendError` from `sddb_core::storage`, keeping
//! the service's own code and message.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use sddb_core::storage::BackendError;

/// Map a GetItem SDK error to BackendError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> BackendError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(e) => {
            BackendError::ResourceNotFound(exception_message(e.message(), &e))
        }
        GetItemError::ProvisionedThroughputExceededException(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        GetItemError::RequestLimitExceeded(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        err => classify(&err),
    }
}

/// Map a Query SDK error to BackendError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> BackendError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(e) => {
            BackendError::ResourceNotFound(exception_message(e.message(), &e))
        }
        QueryError::ProvisionedThroughputExceededException(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        QueryError::RequestLimitExceeded(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        err => classify(&err),
    }
}

/// Map a PutItem SDK error to BackendError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> BackendError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(e) => {
            BackendError::ConditionFailed(exception_message(e.message(), &e))
        }
        PutItemError::ResourceNotFoundException(e) => {
            BackendError::ResourceNotFound(exception_message(e.message(), &e))
        }
        PutItemError::ProvisionedThroughputExceededException(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        PutItemError::RequestLimitExceeded(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        err => classify(&err),
    }
}

/// Map an UpdateItem SDK error to BackendError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> BackendError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(e) => {
            BackendError::ConditionFailed(exception_message(e.message(), &e))
        }
        UpdateItemError::ResourceNotFoundException(e) => {
            BackendError::ResourceNotFound(exception_message(e.message(), &e))
        }
        UpdateItemError::ProvisionedThroughputExceededException(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        UpdateItemError::RequestLimitExceeded(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        err => classify(&err),
    }
}

/// Map a CreateTable SDK error to BackendError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
) -> BackendError {
    if let Some(err) = transport_error(&err) {
        return err;
    }
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(e) => {
            BackendError::AlreadyExists(exception_message(e.message(), &e))
        }
        CreateTableError::LimitExceededException(e) => {
            BackendError::Throttled(exception_message(e.message(), &e))
        }
        err => classify(&err),
    }
}

/// Requests that never got a service response.
fn transport_error<E, R>(err: &SdkError<E, R>) -> Option<BackendError>
where
    E: std::error::Error + 'static,
    R: Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Some(
            BackendError::ConnectionFailed(DisplayErrorContext(err).to_string()),
        ),
        _ => None,
    }
}

/// Falls back on the error code for errors without a dedicated variant.
fn classify<E: ProvideErrorMetadata>(err: &E) -> BackendError {
    let message = message_of(err);
    match err.code() {
        Some("ThrottlingException") => BackendError::Throttled(message),
        Some("ResourceNotFoundException") => BackendError::ResourceNotFound(message),
        Some(code) => BackendError::rejected(code, message),
        None => BackendError::rejected("Unhandled", message),
    }
}

fn message_of<E: ProvideErrorMetadata>(err: &E) -> String {
    err.meta().message().unwrap_or_default().to_string()
}

/// A modeled exception carries its message in its own field; the metadata
/// is only a fallback.
fn exception_message<E: ProvideErrorMetadata>(own: Option<&str>, err: &E) -> String {
    own.or_else(|| err.meta().message())
        .unwrap_or_default()
        .to_string()
}
