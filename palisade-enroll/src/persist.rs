//! Credential persistence.
//!
//! Persistence is the terminal, all-or-nothing step of a successful
//! enrollment: the key, leaf certificate and CA certificate are staged as
//! `.tmp` siblings first and only renamed into place once every write has
//! succeeded, so a failure never leaves a partial credential set behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::error::EnrollError;

const KEY_PEM_TAG: &str = "EC PRIVATE KEY";
const CERT_PEM_TAG: &str = "CERTIFICATE";

fn pem_string(tag: &str, der: &[u8]) -> String {
    pem::encode(&pem::Pem::new(tag, der.to_vec()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn persist_err(path: &Path) -> impl FnOnce(std::io::Error) -> EnrollError + '_ {
    move |source| EnrollError::Persist {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the key file with owner-only permissions, truncating any prior
/// contents.
fn write_restricted(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)
}

/// Write key, leaf certificate and CA certificate as PEM files.
///
/// `key_sec1_der` is wrapped in an `EC PRIVATE KEY` block and written with
/// mode 0o600; both certificate DERs are wrapped verbatim in `CERTIFICATE`
/// blocks. On any failure the staged temporaries are removed and nothing
/// is renamed into place.
pub fn write_credentials(
    key_sec1_der: &[u8],
    leaf_der: &[u8],
    ca_der: &[u8],
    key_path: &Path,
    cert_path: &Path,
    ca_cert_path: &Path,
) -> Result<(), EnrollError> {
    let result = stage_and_commit(
        key_sec1_der,
        leaf_der,
        ca_der,
        key_path,
        cert_path,
        ca_cert_path,
    );
    if result.is_err() {
        for path in [key_path, cert_path, ca_cert_path] {
            let _ = fs::remove_file(temp_path(path));
        }
    }
    result
}

fn stage_and_commit(
    key_sec1_der: &[u8],
    leaf_der: &[u8],
    ca_der: &[u8],
    key_path: &Path,
    cert_path: &Path,
    ca_cert_path: &Path,
) -> Result<(), EnrollError> {
    let key_pem = Zeroizing::new(pem_string(KEY_PEM_TAG, key_sec1_der));
    let cert_pem = pem_string(CERT_PEM_TAG, leaf_der);
    let ca_pem = pem_string(CERT_PEM_TAG, ca_der);

    let key_tmp = temp_path(key_path);
    let cert_tmp = temp_path(cert_path);
    let ca_tmp = temp_path(ca_cert_path);

    write_restricted(&key_tmp, key_pem.as_bytes()).map_err(persist_err(key_path))?;
    fs::write(&cert_tmp, &cert_pem).map_err(persist_err(cert_path))?;
    fs::write(&ca_tmp, &ca_pem).map_err(persist_err(ca_cert_path))?;

    fs::rename(&key_tmp, key_path).map_err(persist_err(key_path))?;
    fs::rename(&cert_tmp, cert_path).map_err(persist_err(cert_path))?;
    fs::rename(&ca_tmp, ca_cert_path).map_err(persist_err(ca_cert_path))?;

    Ok(())
}
