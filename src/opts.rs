use smart_default::SmartDefault;

/// Configuration for result retrieval and decoding.
///
/// ```rs
/// let mut opts = ResultOpts::default();
/// opts.fetch_size = 500;
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct ResultOpts {
    /// Rows requested per COM_STMT_FETCH when iterating a server-side cursor.
    #[default = 100]
    pub fetch_size: u32,

    /// Also resolve column names against the original (unaliased) column
    /// names, not only the labels.
    pub use_original_names: bool,

    /// Text inference treats an empty string as the integer 0 instead of
    /// failing the conversion.
    pub empty_string_is_zero: bool,

    /// Issue `SET net_write_timeout=<n>` before draining an abandoned
    /// streaming result, restoring the server-side write timeout while the
    /// remaining rows are discarded. This is a server-specific workaround;
    /// leave `None` unless the deployment needs it.
    pub drain_net_write_timeout: Option<u32>,
}
