use crate::core::errors::ExchangeError;
use std::collections::BTreeMap;

/// Form parameters of a request. Keys are unique and iterate in sorted order,
/// which is the order signatures are computed over.
pub type FormParams = BTreeMap<String, String>;

/// Signer trait for request authentication
///
/// Implementations add their authentication fields to the form in place.
/// Signing must be deterministic for a given form and key pair.
pub trait Signer: Send + Sync {
    fn sign_form(&self, form: &mut FormParams) -> Result<(), ExchangeError>;
}

/// Encode a form as `application/x-www-form-urlencoded` in key order.
///
/// This is the same encoding `reqwest` uses when it transmits the form, so a
/// signature computed over it matches what the server reconstructs.
pub fn encode_form(form: &FormParams) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.iter())
        .finish()
}
