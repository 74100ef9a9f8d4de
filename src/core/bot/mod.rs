pub mod channels;

use log::{debug, info};
use std::sync::Arc;

use crate::core::error::BotResult;
use crate::feedback::{FeedbackRelay, InferenceFeedback};
use crate::recognition::rank;
use crate::recognizer::RecognitionBackend;
use crate::reply::ReplyAssembler;
use crate::security::ReferenceCodec;
use channels::MessengerChannel;

/// Per-event pipeline: fetch, recognize, rank, assemble, reply.
pub struct BotApp {
    channel: Arc<dyn MessengerChannel>,
    backend: Arc<dyn RecognitionBackend>,
    codec: ReferenceCodec,
    assembler: ReplyAssembler,
    feedback: FeedbackRelay,
}

impl BotApp {
    pub fn new(
        channel: Arc<dyn MessengerChannel>,
        backend: Arc<dyn RecognitionBackend>,
        codec: ReferenceCodec,
        assembler: ReplyAssembler,
    ) -> Self {
        let feedback = FeedbackRelay::new(backend.clone(), assembler.phrases());
        Self {
            channel,
            backend,
            codec,
            assembler,
            feedback,
        }
    }

    pub fn channel(&self) -> &Arc<dyn MessengerChannel> {
        &self.channel
    }

    pub fn backend(&self) -> &Arc<dyn RecognitionBackend> {
        &self.backend
    }

    pub fn codec(&self) -> &ReferenceCodec {
        &self.codec
    }

    /// Recognizes the faces in an image message and replies with the result.
    pub async fn send_recognized(&self, message_id: &str, reply_token: &str) -> BotResult<()> {
        let content = self.channel.fetch_content(message_id).await?;
        debug!(
            "Fetched {} bytes ({}) for message {}",
            content.data.len(),
            content.content_type,
            message_id
        );

        let result = self
            .backend
            .recognize_faces(&content.content_type, &content.data)
            .await?;
        let ranked = rank(result.faces);
        info!(
            "Message {}: {} face(s) detected, {} recognized",
            message_id, ranked.total_detected, ranked.accepted_count
        );

        let key = self.codec.encode(message_id)?;
        let messages = self.assembler.recognition(&ranked, &key);
        self.channel.reply(reply_token, messages).await
    }

    /// Looks up labels matching `query` and proposes a sample of their pending inferences.
    pub async fn send_proposals(&self, query: &str, reply_token: &str) -> BotResult<()> {
        let labels = self.backend.labels(query).await?;
        let label_ids: Vec<u32> = labels.iter().map(|l| l.id).filter(|id| *id > 0).collect();
        if label_ids.is_empty() {
            info!("No labels match {:?}", query);
            return Ok(());
        }

        let inferences = self.backend.inferences(&label_ids).await?;
        let messages = self.assembler.proposals(&inferences, &mut rand::rng());
        if messages.is_empty() {
            info!("No inferences to propose for {:?}", query);
            return Ok(());
        }
        self.channel.reply(reply_token, messages).await
    }

    /// Registers a user who just added the bot. The token stays with the backend.
    pub async fn register_follower(&self, user_id: &str) -> BotResult<()> {
        self.backend.register_user(user_id, user_id).await?;
        info!("Follower {} registered", user_id);
        Ok(())
    }

    /// Relays a postback verdict and confirms it to the user.
    pub async fn handle_postback(&self, data: &str, reply_token: &str) -> BotResult<()> {
        let feedback: InferenceFeedback = data.parse()?;
        let outcome = self.feedback.submit_feedback(feedback).await?;
        let message = self.feedback.confirmation(&outcome);
        self.channel.reply(reply_token, vec![message]).await
    }
}
