// src/services/upload_service.rs

use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::fs;

use crate::common::error::AppError;

// Limites do upload de imagens de imóveis
pub const MAX_FILES_PER_REQUEST: usize = 10;
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    fn properties_dir(&self) -> PathBuf {
        self.upload_dir.join("properties")
    }

    /// Extensão canônica por MIME. Só aceitamos os formatos de imagem da web.
    fn extension_for(content_type: &str) -> Option<&'static str> {
        match content_type {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }

    /// Grava uma imagem em disco e devolve o caminho público (/uploads/...).
    pub async fn save_image(&self, content_type: &str, data: &[u8]) -> Result<String, AppError> {
        let ext = Self::extension_for(content_type).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Tipo de arquivo '{}' não suportado. Use JPEG, PNG, GIF ou WebP.",
                content_type
            ))
        })?;
        if data.is_empty() {
            return Err(AppError::BadRequest("O arquivo está vazio.".into()));
        }
        if data.len() > MAX_FILE_SIZE_BYTES {
            return Err(AppError::BadRequest(
                "O arquivo excede o limite de 10MB.".into(),
            ));
        }

        let dir = self.properties_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar diretório de upload: {}", e))?;

        // Nome único: timestamp + sufixo aleatório, como os códigos de fallback
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        let filename = format!(
            "property-{}-{:06}.{}",
            chrono::Utc::now().timestamp_millis(),
            suffix,
            ext
        );
        fs::write(dir.join(&filename), data)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar o arquivo: {}", e))?;

        Ok(format!("/uploads/properties/{}", filename))
    }

    pub async fn list_images(&self) -> Result<Vec<String>, AppError> {
        let dir = self.properties_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao ler diretório de upload: {}", e))?;

        let mut urls = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao ler diretório de upload: {}", e))?
        {
            if let Some(name) = entry.file_name().to_str() {
                urls.push(format!("/uploads/properties/{}", name));
            }
        }
        urls.sort();
        Ok(urls)
    }

    /// Remove um arquivo pelo nome. O nome é validado para impedir traversal.
    pub async fn delete_image(&self, filename: &str) -> Result<(), AppError> {
        if filename.is_empty()
            || Path::new(filename).components().count() != 1
            || filename.starts_with('.')
        {
            return Err(AppError::BadRequest("Nome de arquivo inválido.".into()));
        }

        let path = self.properties_dir().join(filename);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("Arquivo"))
            }
            Err(e) => Err(anyhow::anyhow!("Falha ao remover o arquivo: {}", e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn so_aceita_formatos_de_imagem_da_web() {
        assert_eq!(UploadService::extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(UploadService::extension_for("image/webp"), Some("webp"));
        assert_eq!(UploadService::extension_for("application/pdf"), None);
        assert_eq!(UploadService::extension_for("text/html"), None);
    }

    #[tokio::test]
    async fn grava_lista_e_remove_imagem() {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", uuid::Uuid::new_v4()));
        let service = UploadService::new(dir.clone());

        let url = service.save_image("image/png", b"fake-png").await.unwrap();
        assert!(url.starts_with("/uploads/properties/property-"));
        assert!(url.ends_with(".png"));

        let listed = service.list_images().await.unwrap();
        assert_eq!(listed.len(), 1);

        let filename = url.rsplit('/').next().unwrap();
        service.delete_image(filename).await.unwrap();
        assert!(service.list_images().await.unwrap().is_empty());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn rejeita_traversal_no_nome() {
        let service = UploadService::new(std::env::temp_dir());
        assert!(service.delete_image("../etc/passwd").await.is_err());
        assert!(service.delete_image(".hidden").await.is_err());
    }
}
