//! Image classification through an external program.
//!
//! The program receives the raw image on stdin and prints its top
//! predictions on stdout, best first, one per line. Each line holds a label,
//! optionally preceded by a class id and followed by a score, e.g.
//! `n04285008 sports_car 0.91`.

use std::{
    io::{ErrorKind, Write},
    process::{Command, Stdio},
    thread,
};

use lot_config::ClassifierSettings;
use lot_core::{ClassificationAdapter, CoreError, Prediction, VehicleClassifier};

/// Runs a configured command per image.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Option<Self> {
        let program = settings.command.as_deref()?.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self::new(program, settings.args.clone()))
    }
}

impl VehicleClassifier for CommandClassifier {
    fn predict(&self, image: &[u8]) -> Result<Vec<Prediction>, CoreError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                CoreError::Classification(format!("failed to start `{}`: {}", self.program, err))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CoreError::Classification("classifier stdin unavailable".into()))?;
        let bytes = image.to_vec();
        // Fed from a separate thread so a chatty child cannot fill its stdout
        // pipe while we are still writing.
        let feeder = thread::spawn(move || stdin.write_all(&bytes));

        let output = child.wait_with_output()?;
        match feeder.join() {
            Ok(Ok(())) => {}
            // The program may legitimately stop reading early.
            Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                return Err(CoreError::Classification(
                    "classifier input thread panicked".into(),
                ))
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Classification(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let predictions = parse_predictions(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(count = predictions.len(), "classifier predictions received");
        Ok(predictions)
    }
}

/// Builds the adapter described by the configuration, disabled when no
/// command is configured.
pub fn adapter_from_settings(settings: &ClassifierSettings) -> ClassificationAdapter {
    match CommandClassifier::from_settings(settings) {
        Some(classifier) => ClassificationAdapter::new(Box::new(classifier), settings.top_k),
        None => ClassificationAdapter::disabled(),
    }
}

/// Parses classifier stdout. Blank lines are skipped.
pub fn parse_predictions(text: &str) -> Vec<Prediction> {
    text.lines()
        .filter_map(|line| {
            let mut tokens: Vec<&str> = line.split_whitespace().collect();
            let confidence = match tokens.last().map(|last| last.parse::<f32>()) {
                Some(Ok(score)) if tokens.len() > 1 => {
                    tokens.pop();
                    Some(score)
                }
                _ => None,
            };
            tokens
                .last()
                .map(|label| Prediction::new(*label, confidence))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lot_domain::VehicleCategory;

    #[test]
    fn parses_decoded_prediction_lines() {
        let predictions = parse_predictions(
            "n04285008 sports_car 0.91\n\nn03100240 convertible 0.05\ngrille\n",
        );
        assert_eq!(
            predictions,
            vec![
                Prediction::new("sports_car", Some(0.91)),
                Prediction::new("convertible", Some(0.05)),
                Prediction::new("grille", None),
            ]
        );
    }

    #[test]
    fn numeric_only_line_is_a_label() {
        assert_eq!(parse_predictions("42"), vec![Prediction::new("42", None)]);
    }

    #[test]
    fn empty_settings_disable_the_adapter() {
        let settings = ClassifierSettings::default();
        assert!(!adapter_from_settings(&settings).is_enabled());

        let blank = ClassifierSettings {
            command: Some("  ".into()),
            ..ClassifierSettings::default()
        };
        assert!(CommandClassifier::from_settings(&blank).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn classifies_through_a_shell_command() {
        let classifier = CommandClassifier::new(
            "sh",
            vec![
                "-c".into(),
                "cat > /dev/null; echo 'n03417042 garbage_truck 0.80'; echo 'n04285008 sports_car 0.10'"
                    .into(),
            ],
        );
        let adapter = ClassificationAdapter::new(Box::new(classifier), 3);
        assert_eq!(adapter.classify(b"\x89PNG fake"), VehicleCategory::Truck);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_a_classification_error() {
        let classifier =
            CommandClassifier::new("sh", vec!["-c".into(), "echo broken >&2; exit 3".into()]);
        let err = classifier.predict(b"img").unwrap_err();
        assert!(matches!(err, CoreError::Classification(message) if message.contains("broken")));
    }

    #[test]
    fn missing_program_degrades_to_unknown() {
        let classifier = CommandClassifier::new("definitely-not-a-classifier-binary", vec![]);
        let adapter = ClassificationAdapter::new(Box::new(classifier), 3);
        assert_eq!(adapter.classify(b"img"), VehicleCategory::Unknown);
    }
}
