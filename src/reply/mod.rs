//! Turns ranked recognition results and inference proposals into LINE reply messages.

pub mod messages;
pub mod phrases;

pub use messages::{Action, CarouselColumn, OutboundMessage, Template};
pub use phrases::{Locale, Phrases, HAPPY_MARKER, SAD_MARKER};

use log::debug;
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use urlencoding::encode;

use crate::feedback::InferenceFeedback;
use crate::recognition::{DetectedFace, RankedFaces};
use crate::recognizer::Inference;
use crate::security::SecureReference;
use messages::MAX_COLUMNS;

/// Caption fragment naming the account a photo came from, e.g. `"Alice (@alice): ..."`.
static CAPTION_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" \((@\w+)\): ").expect("caption pattern is valid"));

/// How the carousel picks its items.
pub enum Selection<'r> {
    /// Keep the given order.
    Ranked,
    /// Uniform random sample, drawn from the supplied generator.
    Sampled(&'r mut dyn RngCore),
}

/// Maps one candidate item to a carousel card. `None` drops the item.
pub trait CardMapping {
    type Item;

    fn column(&self, item: &Self::Item) -> Option<CarouselColumn>;
}

/// Cards for faces found by a live recognition, thumbnails served from `/image`.
pub struct RecognitionCards<'a> {
    image_endpoint: &'a str,
    key: &'a SecureReference,
    phrases: Phrases,
}

impl CardMapping for RecognitionCards<'_> {
    type Item = DetectedFace;

    fn column(&self, face: &DetectedFace) -> Option<CarouselColumn> {
        let top = face.top()?;
        let crop = face.crop();
        if crop.is_degenerate() {
            debug!("Skipping face of {} with degenerate crop", top.label.name);
            return None;
        }

        let thumbnail = format!(
            "{}?key={}&srt={}&w={}&h={}",
            self.image_endpoint,
            encode(self.key.as_str()),
            encode(&crop.srt()),
            crop.width,
            crop.height
        );
        let action = match top.label.profile_handle() {
            Some(handle) => Action::uri(
                &format!("@{handle}"),
                format!("https://twitter.com/{handle}"),
            ),
            None => Action::message(self.phrases.details(), top.label.name.clone()),
        };

        Some(CarouselColumn::new(
            thumbnail,
            &top.label.display_name(),
            &format!("{:.2}", top.confidence * 100.0),
            vec![action],
        ))
    }
}

/// Cards for pending inferences, offering a postback that accepts the proposal.
pub struct ProposalCards<'a> {
    thumbnail_endpoint: &'a str,
    phrases: Phrases,
}

impl CardMapping for ProposalCards<'_> {
    type Item = Inference;

    fn column(&self, inference: &Inference) -> Option<CarouselColumn> {
        if inference.face.image_url.is_empty() {
            return None;
        }

        let mut thumbnail = format!(
            "{}?image_url={}",
            self.thumbnail_endpoint,
            encode(&inference.face.image_url)
        );
        if let Some(handle) = CAPTION_HANDLE
            .captures(&inference.face.photo.caption)
            .and_then(|c| c.get(1))
        {
            thumbnail.push_str("&from=");
            thumbnail.push_str(&encode(handle.as_str()));
        }

        let mut actions = Vec::with_capacity(2);
        if !inference.face.photo.source_url.is_empty() {
            actions.push(Action::uri(
                self.phrases.details(),
                inference.face.photo.source_url.clone(),
            ));
        }
        actions.push(Action::postback(
            self.phrases.correct(),
            InferenceFeedback::accept(inference.face.id, inference.id).to_string(),
        ));

        // carousel cards must carry a text
        let mut text = inference.label.display_name_full();
        if text.trim().is_empty() {
            text = format!("label:{}", inference.label.id);
        }

        Some(CarouselColumn::new(
            thumbnail,
            &format!("id:{} [{:.5}]", inference.face.id, inference.score),
            &text,
            actions,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct ReplyAssembler {
    image_endpoint: String,
    thumbnail_endpoint: String,
    phrases: Phrases,
}

impl ReplyAssembler {
    pub fn new(base_url: &str, locale: Locale) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            image_endpoint: format!("{base}/image"),
            thumbnail_endpoint: format!("{base}/thumbnail"),
            phrases: Phrases::new(locale),
        }
    }

    pub fn phrases(&self) -> Phrases {
        self.phrases
    }

    /// Reply for a recognized photo: a summary text, then a carousel when any match can be
    /// shown. Matches without a single renderable card are reported like no match.
    pub fn recognition(&self, ranked: &RankedFaces, key: &SecureReference) -> Vec<OutboundMessage> {
        if ranked.has_matches() {
            let mapping = RecognitionCards {
                image_endpoint: &self.image_endpoint,
                key,
                phrases: self.phrases,
            };
            if let Some(carousel) = self.carousel(&ranked.accepted, Selection::Ranked, &mapping) {
                let displayed = carousel.columns().map_or(0, <[CarouselColumn]>::len);
                let text = self
                    .phrases
                    .recognized(ranked.accepted_count, ranked.total_detected, displayed);
                return vec![OutboundMessage::text(text), carousel];
            }
            debug!("None of {} matches has a displayable card", ranked.accepted_count);
        }

        let text = if ranked.total_detected > 0 {
            self.phrases.unrecognized(ranked.total_detected)
        } else {
            self.phrases.no_face()
        };
        vec![OutboundMessage::text(text)]
    }

    /// Reply proposing a random sample of pending inferences. Empty when none can be shown.
    pub fn proposals(&self, inferences: &[Inference], rng: &mut dyn RngCore) -> Vec<OutboundMessage> {
        let mapping = ProposalCards {
            thumbnail_endpoint: &self.thumbnail_endpoint,
            phrases: self.phrases,
        };
        self.carousel(inferences, Selection::Sampled(rng), &mapping)
            .into_iter()
            .collect()
    }

    /// Builds a carousel of at most five cards; the alt text lists each card as
    /// `"title [text]"`.
    pub fn carousel<M: CardMapping>(
        &self,
        items: &[M::Item],
        selection: Selection<'_>,
        mapping: &M,
    ) -> Option<OutboundMessage> {
        let columns: Vec<CarouselColumn> = select(items, selection)
            .into_iter()
            .filter_map(|item| mapping.column(item))
            .take(MAX_COLUMNS)
            .collect();
        if columns.is_empty() {
            return None;
        }

        let alt_text = columns
            .iter()
            .map(CarouselColumn::summary_line)
            .collect::<Vec<_>>()
            .join("\n");
        Some(OutboundMessage::carousel(&alt_text, columns))
    }
}

fn select<'a, T>(items: &'a [T], selection: Selection<'_>) -> Vec<&'a T> {
    match selection {
        Selection::Ranked => items.iter().take(MAX_COLUMNS).collect(),
        Selection::Sampled(rng) => {
            let amount = items.len().min(MAX_COLUMNS);
            rand::seq::index::sample(rng, items.len(), amount)
                .into_iter()
                .map(|i| &items[i])
                .collect()
        }
    }
}
