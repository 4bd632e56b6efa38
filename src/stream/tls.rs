//! Blocking TLS stream backed by `rustls`.
//!
//! Unlike `boomnet::stream::tls`, which drives `rustls` by hand
//! (`complete_io`) to cooperate with a non-blocking `mio` reactor, this
//! engine runs over a blocking socket, so `rustls::StreamOwned` already does
//! the right thing: the handshake and all subsequent reads/writes block the
//! calling thread until they can make progress.

use crate::request::CertCheck;
use crate::stream::tcp::TcpStream;
use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, Error, RootCertStore, SignatureScheme, StreamOwned};
use std::io;
use std::io::{Read, Write};
use std::sync::Arc;

pub struct TlsStream {
    inner: StreamOwned<ClientConnection, TcpStream>,
}

fn default_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();

    #[cfg(all(feature = "rustls-native-certs", not(feature = "rustls-webpki")))]
    {
        match rustls_native_certs::load_native_certs() {
            Ok(certs) => {
                for cert in certs {
                    let _ = root_store.add(cert);
                }
            }
            Err(err) => log::warn!("unable to load platform cert store: {err}"),
        }
    }

    #[cfg(feature = "rustls-webpki")]
    {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    root_store
}

impl TlsStream {
    /// Negotiates TLS over `tcp`. The platform/webpki trust store (selected
    /// by the `rustls-native`/`rustls-webpki` feature) performs the ordinary
    /// chain-and-signature verification; `check_certs` is then consulted as
    /// an additional, caller-supplied acceptance gate over the verified
    /// peer certificate chain (spec.md §3: "checkCerts: predicate over peer
    /// certificate chain, invoked only when `secure`").
    pub fn wrap(tcp: TcpStream, server_name: &str, check_certs: &CertCheck) -> io::Result<TlsStream> {
        let root_store = Arc::new(default_root_store());
        let inner_verifier = WebPkiServerVerifier::builder(root_store)
            .build()
            .map_err(io::Error::other)?;

        let mut config = ClientConfig::builder()
            .with_root_certificates(RootCertStore::empty())
            .with_no_client_auth();

        let verifier = Arc::new(PredicateVerifier {
            inner: inner_verifier,
            check_certs: check_certs.clone(),
        });
        config.dangerous().set_certificate_verifier(verifier);

        let server_name: ServerName<'static> = server_name.to_string().try_into().map_err(io::Error::other)?;
        let connection = ClientConnection::new(Arc::new(config), server_name).map_err(io::Error::other)?;

        Ok(Self {
            inner: StreamOwned::new(connection, tcp),
        })
    }

    pub fn close(&mut self) -> io::Result<()> {
        self.inner.conn.send_close_notify();
        let _ = self.inner.flush();
        self.inner.sock.close()
    }
}

impl Read for TlsStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for TlsStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Bridges `rustls`'s certificate verifier hook to the engine's own
/// `CertCheck` predicate. Delegates the cryptographic work to the platform
/// trust store's verifier (`inner`) and layers the caller's predicate on top
/// of its result, rather than asserting unconditionally the way
/// `boomnet::stream::tls::__rustls::NoCertVerification` does.
struct PredicateVerifier {
    inner: Arc<WebPkiServerVerifier>,
    check_certs: CertCheck,
}

impl std::fmt::Debug for PredicateVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateVerifier").finish_non_exhaustive()
    }
}

impl ServerCertVerifier for PredicateVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        let verified = self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)?;

        let mut chain = Vec::with_capacity(intermediates.len() + 1);
        chain.push(end_entity.as_ref().to_vec());
        chain.extend(intermediates.iter().map(|der| der.as_ref().to_vec()));

        if (self.check_certs)(&chain) {
            Ok(verified)
        } else {
            Err(Error::General("certificate rejected by check_certs predicate".into()))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
