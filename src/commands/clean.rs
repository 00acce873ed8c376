//! Clean the public directory.

use anyhow::Result;
use std::fs;

use crate::Folio;

pub fn run(folio: &Folio) -> Result<()> {
    if folio.public_dir.exists() {
        fs::remove_dir_all(&folio.public_dir)?;
        tracing::info!("Deleted: {:?}", folio.public_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        fs::create_dir_all(folio.public_dir.join("blog")).unwrap();

        run(&folio).unwrap();
        assert!(!folio.public_dir.exists());

        // Cleaning twice is fine.
        run(&folio).unwrap();
    }
}
