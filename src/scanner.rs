use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::classifier::Classifier;

/// Configuration for chat-log scanning behavior
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
        }
    }
}

/// Statistics for one scanned log file
#[derive(Debug, Clone)]
pub struct ScanStats {
    pub file_path: String,
    pub lines_read: u64,
    pub flagged: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// One flagged line of a scanned chat log.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub line: u64,
    pub category: String,
    pub matched: String,
    pub raw: String,
}

/// Async scanner that streams a chat log line-by-line through the classifier.
///
/// The dense view is the primary path; lines it clears are re-checked through
/// the evasion-hardened despaced path.
pub struct ChatLogScanner<'a> {
    config: ScanConfig,
    classifier: &'a Classifier,
}

impl<'a> ChatLogScanner<'a> {
    pub fn new(config: ScanConfig, classifier: &'a Classifier) -> Self {
        Self { config, classifier }
    }

    fn classify_line(&self, line: &str) -> Option<(String, String)> {
        let hit = self
            .classifier
            .classify(line)
            .or_else(|| self.classifier.classify_despaced(line))?;
        Some((hit.category, hit.matched))
    }

    /// Scan one file, returning its findings and read statistics.
    pub async fn scan_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(Vec<Finding>, ScanStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting scan of chat log: {}", path.display());

        // WHY: early validation prevents partial processing and provides clear error context
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open chat log {}: {}", path.display(), e);
                warn!("{}", error_msg);

                let stats = ScanStats {
                    file_path: path.display().to_string(),
                    lines_read: 0,
                    flagged: 0,
                    duration_ms: start_time.elapsed().as_millis() as u64,
                    read_error: Some(error_msg.clone()),
                };

                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                } else {
                    return Ok((Vec::new(), stats));
                }
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut findings = Vec::new();
        let mut line_count = 0u64;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    line_count += 1;
                    if let Some((category, matched)) = self.classify_line(&line) {
                        debug!(line = line_count, %category, "flagged chat line");
                        findings.push(Finding {
                            line: line_count,
                            category,
                            matched,
                            raw: line,
                        });
                    }
                }
                Ok(None) => {
                    break;
                }
                Err(e) => {
                    let error_msg = format!(
                        "UTF-8 decoding error in {} at line {}: {}",
                        path.display(),
                        line_count + 1,
                        e
                    );
                    warn!("{}", error_msg);

                    let stats = ScanStats {
                        file_path: path.display().to_string(),
                        lines_read: line_count,
                        flagged: findings.len() as u64,
                        duration_ms: start_time.elapsed().as_millis() as u64,
                        read_error: Some(error_msg.clone()),
                    };

                    if self.config.fail_fast {
                        return Err(anyhow::anyhow!(error_msg));
                    } else {
                        // Return partial results with error information
                        return Ok((findings, stats));
                    }
                }
            }
        }

        let stats = ScanStats {
            file_path: path.display().to_string(),
            lines_read: line_count,
            flagged: findings.len() as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        info!(
            "Scanned {}: {} lines, {} flagged in {}ms",
            path.display(),
            line_count,
            stats.flagged,
            stats.duration_ms
        );

        Ok((findings, stats))
    }

    /// Scan multiple files sequentially.
    ///
    /// WHY: sequential processing keeps memory bounded and error reporting
    /// per-file; a chat log line is cheap to classify, the disk is the limit
    pub async fn scan_files<P: AsRef<Path>>(
        &self,
        file_paths: &[P],
    ) -> Result<Vec<(Vec<Finding>, ScanStats)>> {
        info!("Starting scan of {} chat logs", file_paths.len());

        let mut results = Vec::new();

        for file_path in file_paths {
            match self.scan_file(file_path).await {
                Ok(result) => {
                    results.push(result);
                }
                Err(e) => {
                    if self.config.fail_fast {
                        return Err(e);
                    } else {
                        warn!("Failed to scan {}: {}", file_path.as_ref().display(), e);
                        let stats = ScanStats {
                            file_path: file_path.as_ref().display().to_string(),
                            lines_read: 0,
                            flagged: 0,
                            duration_ms: 0,
                            read_error: Some(e.to_string()),
                        };
                        results.push((Vec::new(), stats));
                    }
                }
            }
        }

        info!("Completed scan of {} chat logs", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{CategoryTable, Normalizer};
    use tempfile::TempDir;
    use tokio::fs;

    fn test_classifier() -> Classifier {
        let table = CategoryTable::from_pairs([("flagged", "grumble")]).unwrap();
        Classifier::new(Normalizer::default(), table)
    }

    async fn create_test_log(dir: &Path, name: &str, content: &str) -> Result<std::path::PathBuf> {
        let file_path = dir.join(name);
        fs::write(&file_path, content).await?;
        Ok(file_path)
    }

    #[tokio::test]
    async fn test_scan_flags_matching_lines() {
        let temp_dir = TempDir::new().unwrap();
        let classifier = test_classifier();
        let scanner = ChatLogScanner::new(ScanConfig::default(), &classifier);

        let content = "hello there\nsuch a GRUMBLE today\nall quiet\ng r u m b l e";
        let file_path = create_test_log(temp_dir.path(), "chat.log", content)
            .await
            .unwrap();

        let (findings, stats) = scanner.scan_file(&file_path).await.unwrap();

        assert_eq!(stats.lines_read, 4);
        assert_eq!(stats.flagged, 2);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].category, "flagged");
        assert_eq!(findings[0].matched, "grumble");
        // Letter-spacing collapses out of the dense view
        assert_eq!(findings[1].line, 4);
        assert_eq!(findings[1].matched, "grumble");
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_scan_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let classifier = test_classifier();
        let scanner = ChatLogScanner::new(ScanConfig::default(), &classifier);

        let file_path = create_test_log(temp_dir.path(), "empty.log", "")
            .await
            .unwrap();

        let (findings, stats) = scanner.scan_file(&file_path).await.unwrap();

        assert!(findings.is_empty());
        assert_eq!(stats.lines_read, 0);
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_scan_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let classifier = test_classifier();
        let scanner = ChatLogScanner::new(
            ScanConfig {
                fail_fast: false,
                ..Default::default()
            },
            &classifier,
        );

        let file_path = temp_dir.path().join("nonexistent.log");
        let (findings, stats) = scanner.scan_file(&file_path).await.unwrap();

        assert!(findings.is_empty());
        assert!(stats.read_error.is_some());
    }

    #[tokio::test]
    async fn test_scan_nonexistent_file_fail_fast() {
        let temp_dir = TempDir::new().unwrap();
        let classifier = test_classifier();
        let scanner = ChatLogScanner::new(
            ScanConfig {
                fail_fast: true,
                ..Default::default()
            },
            &classifier,
        );

        let file_path = temp_dir.path().join("nonexistent.log");
        assert!(scanner.scan_file(&file_path).await.is_err());
    }

    #[tokio::test]
    async fn test_scan_files_batch() {
        let temp_dir = TempDir::new().unwrap();
        let classifier = test_classifier();
        let scanner = ChatLogScanner::new(ScanConfig::default(), &classifier);

        let file1 = create_test_log(temp_dir.path(), "a.log", "grumble here\nfine")
            .await
            .unwrap();
        let file2 = create_test_log(temp_dir.path(), "b.log", "all clear")
            .await
            .unwrap();

        let results = scanner.scan_files(&[&file1, &file2]).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1.flagged, 1);
        assert_eq!(results[1].1.flagged, 0);
    }
}
