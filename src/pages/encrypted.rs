use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::trace;
use scraper::Html;

use super::{PageListDecoder, join_host, script_array, script_string};
use crate::error::{Error, Result};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Decodes chapters whose image host is shipped encrypted.
///
/// The page script carries three variables: the base64 AES-CBC ciphertext of
/// the image host, the key (16 or 32 ASCII bytes) and a JSON array of relative
/// image paths. An IV variable is optional; without one the IV is all zeros.
///
/// ```rust
/// use hondana::pages::EncryptedHostDecoder;
///
/// let decoder = EncryptedHostDecoder::new("img_host", "img_key", "img_list").with_iv_var("img_iv");
/// ```
#[derive(Debug, Clone)]
pub struct EncryptedHostDecoder {
    host_var: String,
    key_var: String,
    iv_var: Option<String>,
    images_var: String,
}

impl EncryptedHostDecoder {
    pub fn new(
        host_var: impl Into<String>,
        key_var: impl Into<String>,
        images_var: impl Into<String>,
    ) -> Self {
        Self {
            host_var: host_var.into(),
            key_var: key_var.into(),
            iv_var: None,
            images_var: images_var.into(),
        }
    }

    pub fn with_iv_var(mut self, iv_var: impl Into<String>) -> Self {
        self.iv_var = Some(iv_var.into());
        self
    }

    fn required(&self, document: &Html, var: &str) -> Result<String> {
        script_string(document, var)?
            .ok_or_else(|| Error::parse(format!("no `{}` in page scripts", var)))
    }
}

/// Decrypts a base64 AES-CBC ciphertext with PKCS#7 padding.
///
/// The key length picks AES-128 or AES-256. The IV must be 16 bytes.
pub fn decrypt_host(ciphertext_b64: &str, key: &[u8], iv: &[u8]) -> Result<String> {
    let mut buffer = STANDARD.decode(ciphertext_b64.trim())?;
    trace!("decrypting {} byte host payload", buffer.len());

    let plain = match key.len() {
        16 => Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|e| Error::decrypt(format!("bad key or iv: {}", e)))?
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|e| Error::decrypt(format!("bad padding: {}", e)))?,
        32 => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|e| Error::decrypt(format!("bad key or iv: {}", e)))?
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|e| Error::decrypt(format!("bad padding: {}", e)))?,
        n => return Err(Error::decrypt(format!("unsupported key length {}", n))),
    };

    String::from_utf8(plain.to_vec())
        .map(|host| host.trim().to_string())
        .map_err(|e| Error::decrypt(format!("host is not UTF-8: {}", e)))
}

impl PageListDecoder for EncryptedHostDecoder {
    fn decode(&self, document: &Html) -> Result<Vec<String>> {
        let ciphertext = self.required(document, &self.host_var)?;
        let key = self.required(document, &self.key_var)?;
        let iv = match &self.iv_var {
            Some(var) => self.required(document, var)?.into_bytes(),
            None => vec![0_u8; 16],
        };

        let host = decrypt_host(&ciphertext, key.as_bytes(), &iv)?;
        let paths = script_array(document, &self.images_var)?.ok_or_else(|| {
            Error::parse(format!("no `{}` image list in page scripts", self.images_var))
        })?;

        Ok(paths.iter().map(|path| join_host(&host, path)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::html;
    use aes::cipher::BlockEncryptMut;

    type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

    const KEY: &str = "pdn8QwMUTDSVfKQf";
    const IV: &str = "0123456789abcdef";

    fn encrypt(plain: &str, key: &str, iv: &[u8]) -> String {
        let pos = plain.len();
        let mut buffer = vec![0_u8; pos + 16];
        buffer[..pos].copy_from_slice(plain.as_bytes());
        let ciphertext = Aes128CbcEnc::new_from_slices(key.as_bytes(), iv)
            .unwrap()
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, pos)
            .unwrap();
        STANDARD.encode(ciphertext)
    }

    #[test]
    fn test_decrypt_host_roundtrip() {
        let ciphertext = encrypt("https://img3.example.net", KEY, IV.as_bytes());
        let host = decrypt_host(&ciphertext, KEY.as_bytes(), IV.as_bytes()).unwrap();
        assert_eq!(host, "https://img3.example.net");
    }

    #[test]
    fn test_decode_with_zero_iv() {
        let ciphertext = encrypt("https://img.example.net/", KEY, &[0_u8; 16]);
        let page = format!(
            r#"<script>
                var img_host = "{}";
                var img_key = "{}";
                var img_list = ["/ch1/001.jpg", "/ch1/002.jpg"];
            </script>"#,
            ciphertext, KEY
        );
        let document = html::parse(&page);
        let decoder = EncryptedHostDecoder::new("img_host", "img_key", "img_list");
        assert_eq!(
            decoder.decode(&document).unwrap(),
            vec![
                "https://img.example.net/ch1/001.jpg",
                "https://img.example.net/ch1/002.jpg"
            ]
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let ciphertext = encrypt("https://img.example.net", KEY, IV.as_bytes());
        let result = decrypt_host(&ciphertext, b"AAAAAAAAAAAAAAAA", IV.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_key_length() {
        let result = decrypt_host("AAAA", b"short", IV.as_bytes());
        assert!(matches!(result, Err(Error::Decrypt(_))));
    }

    #[test]
    fn test_invalid_base64() {
        let result = decrypt_host("not base64!!", KEY.as_bytes(), IV.as_bytes());
        assert!(matches!(result, Err(Error::Base64(_))));
    }
}
