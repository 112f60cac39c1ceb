use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::{encode_form, FormParams, Signer};
use md5::{Digest, Md5};

/// OKCoin v1 request signer
///
/// The signature is the upper-case hex MD5 of the sorted, url-encoded form
/// (including `api_key`) followed by `&secret_key=<secret>`. The secret is
/// only ever part of the hashed string, never a form field.
pub struct OkcoinSigner {
    api_key: String,
    secret_key: String,
}

impl OkcoinSigner {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
        }
    }

    fn generate_signature(payload: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(payload.as_bytes());
        hex::encode_upper(hasher.finalize())
    }
}

impl Signer for OkcoinSigner {
    fn sign_form(&self, form: &mut FormParams) -> Result<(), ExchangeError> {
        form.insert("api_key".to_string(), self.api_key.clone());

        let payload = format!("{}&secret_key={}", encode_form(form), self.secret_key);
        let sign = Self::generate_signature(&payload);

        form.insert("sign".to_string(), sign);
        Ok(())
    }
}
