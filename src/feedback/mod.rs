//! Relays a user's confirmation or rejection of an inference back to the recognizer.

use log::{info, warn};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::error::{BotError, BotResult};
use crate::recognizer::RecognitionBackend;
use crate::reply::{Action, OutboundMessage, Phrases};

const REJECT_PREFIX: &str = "reject:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Postback payload: `"<subject>,<inference>"` to accept, `"reject:<subject>,<inference>"`
/// to retract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceFeedback {
    pub subject_id: u64,
    pub inference_id: u64,
    pub verdict: Verdict,
}

impl InferenceFeedback {
    pub fn accept(subject_id: u64, inference_id: u64) -> Self {
        Self {
            subject_id,
            inference_id,
            verdict: Verdict::Accept,
        }
    }

    pub fn reject(subject_id: u64, inference_id: u64) -> Self {
        Self {
            subject_id,
            inference_id,
            verdict: Verdict::Reject,
        }
    }
}

impl fmt::Display for InferenceFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.verdict == Verdict::Reject {
            f.write_str(REJECT_PREFIX)?;
        }
        write!(f, "{},{}", self.subject_id, self.inference_id)
    }
}

impl FromStr for InferenceFeedback {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verdict, ids) = match s.strip_prefix(REJECT_PREFIX) {
            Some(rest) => (Verdict::Reject, rest),
            None => (Verdict::Accept, s),
        };

        let fields: Vec<&str> = ids.split(',').collect();
        let [subject, inference] = fields.as_slice() else {
            return Err(BotError::Validation(format!(
                "postback needs exactly two fields, got {}",
                fields.len()
            )));
        };

        let parse = |field: &str, name: &str| -> Result<u64, BotError> {
            field
                .trim()
                .parse::<u64>()
                .map_err(|_| BotError::Validation(format!("invalid {name} id: {field:?}")))
        };

        Ok(Self {
            subject_id: parse(*subject, "subject")?,
            inference_id: parse(*inference, "inference")?,
            verdict,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOutcome {
    pub feedback: InferenceFeedback,
    pub result_url: Option<String>,
}

pub struct FeedbackRelay {
    backend: Arc<dyn RecognitionBackend>,
    phrases: Phrases,
}

impl FeedbackRelay {
    pub fn new(backend: Arc<dyn RecognitionBackend>, phrases: Phrases) -> Self {
        Self { backend, phrases }
    }

    /// Forwards the verdict. A response without the success flag is an error and is
    /// never retried.
    pub async fn submit_feedback(&self, feedback: InferenceFeedback) -> BotResult<FeedbackOutcome> {
        let response = match feedback.verdict {
            Verdict::Accept => self.backend.accept_inference(feedback.inference_id).await,
            Verdict::Reject => self.backend.reject_inference(feedback.inference_id).await,
        }
        .inspect_err(|e| {
            warn!(
                "Feedback {:?} for inference {} failed: {}",
                feedback.verdict, feedback.inference_id, e
            )
        })?;

        info!(
            "Recorded {:?} for inference {} (subject {})",
            feedback.verdict, feedback.inference_id, feedback.subject_id
        );

        Ok(FeedbackOutcome {
            feedback,
            result_url: response.result_url.filter(|u| !u.is_empty()),
        })
    }

    /// Follow-up message for a successful submission.
    pub fn confirmation(&self, outcome: &FeedbackOutcome) -> OutboundMessage {
        let feedback = outcome.feedback;
        match feedback.verdict {
            Verdict::Accept => {
                let text = self.phrases.accepted(feedback.subject_id);
                let retract = Action::postback(
                    self.phrases.wrong(),
                    InferenceFeedback::reject(feedback.subject_id, feedback.inference_id)
                        .to_string(),
                );
                let view = match &outcome.result_url {
                    Some(url) => Action::uri(self.phrases.view(), url.clone()),
                    None => Action::message(self.phrases.ok(), self.phrases.ok()),
                };
                OutboundMessage::confirm(&text, &text, [retract, view])
            }
            Verdict::Reject => OutboundMessage::text(self.phrases.rejected(feedback.subject_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::{Label, RecognitionResult};
    use crate::recognizer::{ActionResponse, Inference};
    use crate::reply::{Locale, Template};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubBackend {
        success: bool,
        calls: Mutex<Vec<(&'static str, u64)>>,
    }

    #[async_trait]
    impl RecognitionBackend for StubBackend {
        async fn recognize_faces(&self, _: &str, _: &[u8]) -> BotResult<RecognitionResult> {
            unreachable!()
        }

        async fn register_user(&self, _: &str, _: &str) -> BotResult<String> {
            unreachable!()
        }

        async fn labels(&self, _: &str) -> BotResult<Vec<Label>> {
            unreachable!()
        }

        async fn inferences(&self, _: &[u32]) -> BotResult<Vec<Inference>> {
            unreachable!()
        }

        async fn accept_inference(&self, id: u64) -> BotResult<ActionResponse> {
            self.calls.lock().unwrap().push(("accept", id));
            if !self.success {
                return Err(BotError::BackendFailure("accept failed".into()));
            }
            Ok(ActionResponse {
                success: true,
                result_url: Some(format!("https://face.example.com/inferences/{id}")),
            })
        }

        async fn reject_inference(&self, id: u64) -> BotResult<ActionResponse> {
            self.calls.lock().unwrap().push(("reject", id));
            if !self.success {
                return Err(BotError::BackendFailure("reject failed".into()));
            }
            Ok(ActionResponse {
                success: true,
                result_url: None,
            })
        }

        async fn fetch_image(&self, _: &str) -> BotResult<(String, Bytes)> {
            unreachable!()
        }
    }

    fn relay(success: bool) -> (Arc<StubBackend>, FeedbackRelay) {
        let backend = Arc::new(StubBackend {
            success,
            ..Default::default()
        });
        let relay = FeedbackRelay::new(backend.clone(), Phrases::new(Locale::En));
        (backend, relay)
    }

    #[test]
    fn test_parse_accept_payload() {
        let parsed: InferenceFeedback = "42,1007".parse().expect("valid payload");
        assert_eq!(parsed, InferenceFeedback::accept(42, 1007));
        assert_eq!(parsed.to_string(), "42,1007");
    }

    #[test]
    fn test_parse_reject_payload() {
        let parsed: InferenceFeedback = "reject:42,1007".parse().expect("valid payload");
        assert_eq!(parsed, InferenceFeedback::reject(42, 1007));
        assert_eq!(parsed.to_string(), "reject:42,1007");
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        for payload in ["", "42", "42,", "42,1007,3", "a,b", "reject:", "-1,2", "1,2 3"] {
            let result = payload.parse::<InferenceFeedback>();
            assert!(
                matches!(result, Err(BotError::Validation(_))),
                "payload {payload:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_accept_relayed_with_result_url() {
        let (backend, relay) = relay(true);
        let outcome = relay
            .submit_feedback(InferenceFeedback::accept(5, 77))
            .await
            .expect("accept should succeed");

        assert_eq!(backend.calls.lock().unwrap().as_slice(), &[("accept", 77)]);
        assert_eq!(
            outcome.result_url.as_deref(),
            Some("https://face.example.com/inferences/77")
        );

        let OutboundMessage::Template {
            template: Template::Confirm { actions, .. },
            ..
        } = relay.confirmation(&outcome)
        else {
            panic!("expected confirm template");
        };
        assert_eq!(actions[0], Action::postback("That's wrong", "reject:5,77"));
        assert_eq!(
            actions[1],
            Action::uri("View", "https://face.example.com/inferences/77")
        );
    }

    #[tokio::test]
    async fn test_reject_relayed() {
        let (backend, relay) = relay(true);
        let outcome = relay
            .submit_feedback(InferenceFeedback::reject(5, 77))
            .await
            .expect("reject should succeed");

        assert_eq!(backend.calls.lock().unwrap().as_slice(), &[("reject", 77)]);
        assert_eq!(outcome.result_url, None);
        assert!(relay.confirmation(&outcome).as_text().is_some());
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces() {
        let (backend, relay) = relay(false);
        let result = relay.submit_feedback(InferenceFeedback::accept(5, 77)).await;

        assert!(matches!(result, Err(BotError::BackendFailure(_))));
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }
}
