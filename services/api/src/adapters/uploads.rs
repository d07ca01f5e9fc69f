//! services/api/src/adapters/uploads.rs
//!
//! Local-disk implementation of the `FotoStore` port. Uploaded medicine
//! photos land in the configured uploads directory under a sanitised,
//! collision-free filename; the same directory is served statically at
//! `/uploads`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use farmacia_core::ports::{FotoStore, PortError, PortResult};

/// Stores photos on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFotoStore {
    root: PathBuf,
}

impl LocalFotoStore {
    /// Creates the store, making sure the uploads directory exists.
    pub async fn new(root: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn resolve(&self, filename: &str) -> PathBuf {
        // The stored name is always one of our own sanitised filenames, but
        // strip any path components just in case.
        let base = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        self.root.join(base)
    }
}

/// Turns an arbitrary client filename into `stem_<unique>.ext`, keeping only
/// characters that are safe in a URL path segment.
fn nombre_seguro(original: &str) -> String {
    let path = Path::new(original);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("foto");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let mut limpio: String = stem
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if limpio.is_empty() {
        limpio.push_str("foto");
    }

    let unico = Uuid::new_v4().simple();
    match ext {
        Some(ext) if !ext.is_empty() => format!("{limpio}_{unico}.{ext}"),
        _ => format!("{limpio}_{unico}"),
    }
}

#[async_trait]
impl FotoStore for LocalFotoStore {
    async fn save(&self, original_name: &str, data: &[u8]) -> PortResult<String> {
        let filename = nombre_seguro(original_name);
        let destino = self.root.join(&filename);

        fs::write(&destino, data)
            .await
            .map_err(|e| PortError::Storage(format!("No se pudo guardar la foto: {e}")))?;

        debug!(foto = %filename, bytes = data.len(), "Foto guardada");
        Ok(filename)
    }

    async fn delete(&self, filename: &str) -> PortResult<()> {
        let destino = self.resolve(filename);
        match fs::remove_file(&destino).await {
            Ok(()) => {
                debug!(foto = %filename, "Foto eliminada");
                Ok(())
            }
            // An already-missing photo is fine on item delete/replace.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(format!(
                "No se pudo eliminar la foto: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_de_prueba() -> PathBuf {
        std::env::temp_dir().join(format!("farmacia-uploads-{}", Uuid::new_v4()))
    }

    #[test]
    fn nombre_seguro_limpia_y_conserva_extension() {
        let nombre = nombre_seguro("mi foto de paracetamol!.JPG");
        assert!(nombre.starts_with("mi_foto_de_paracetamol_"));
        assert!(nombre.ends_with(".jpg"));
        assert!(!nombre.contains(' '));
        assert!(!nombre.contains('!'));
    }

    #[test]
    fn nombre_seguro_sin_caracteres_validos_usa_alternativa() {
        let nombre = nombre_seguro("¡¡¡.png");
        assert!(nombre.starts_with("foto_"));
        assert!(nombre.ends_with(".png"));
    }

    #[test]
    fn nombres_seguros_no_colisionan() {
        assert_ne!(nombre_seguro("a.png"), nombre_seguro("a.png"));
    }

    #[tokio::test]
    async fn guarda_y_elimina_una_foto() {
        let dir = dir_de_prueba();
        let store = LocalFotoStore::new(&dir).await.unwrap();

        let filename = store.save("pastilla.png", b"png-bytes").await.unwrap();
        assert!(dir.join(&filename).exists());

        store.delete(&filename).await.unwrap();
        assert!(!dir.join(&filename).exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn eliminar_una_foto_inexistente_no_falla() {
        let dir = dir_de_prueba();
        let store = LocalFotoStore::new(&dir).await.unwrap();

        store.delete("no-existe.png").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
