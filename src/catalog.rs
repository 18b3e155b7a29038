//! Creator catalog views built on top of the API client
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::models::{Creator, Workout};
use crate::api::WorkoutApi;
use crate::Result;

/// Creator together with how many extracted workouts they have
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedCreator {
    #[serde(flatten)]
    pub creator: Creator,
    pub video_count: usize,
}

/// Creator page: the creator and their extracted workouts
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatorDetail {
    pub creator: Creator,
    pub videos: Vec<Workout>,
}

/// First `limit` creators with their video counts
///
/// Counts are fetched concurrently. A creator whose videos cannot be fetched
/// is listed with a count of 0 instead of failing the whole listing.
pub async fn featured_creators(api: &dyn WorkoutApi, limit: usize) -> Result<Vec<FeaturedCreator>> {
    let creators = api.get_creators().await?;
    let total = creators.len();

    let tasks = creators.into_iter().take(limit).map(|creator| async move {
        let video_count = match api.get_videos_by_creator_id(creator.id).await {
            Ok(videos) => videos.len(),
            Err(e) => {
                warn!("Failed to fetch videos for creator {}: {}", creator.name, e);
                0
            }
        };
        FeaturedCreator {
            creator,
            video_count,
        }
    });

    let featured = join_all(tasks).await;
    info!("📚 Loaded {} of {} creators", featured.len(), total);
    Ok(featured)
}

/// Creator plus their videos; a failed video lookup leaves the list empty
pub async fn creator_detail(api: &dyn WorkoutApi, id: i64) -> Result<CreatorDetail> {
    let (creator, videos) = futures::join!(api.get_creator_by_id(id), api.get_videos_by_creator_id(id));
    let creator = creator?;

    let videos = videos.unwrap_or_else(|e| {
        warn!("Failed to fetch videos for creator {}: {}", id, e);
        Vec::new()
    });
    debug!("Creator {} has {} videos", id, videos.len());

    Ok(CreatorDetail { creator, videos })
}

/// Case-insensitive name search; an empty query matches everyone
pub fn filter_creators<'a>(creators: &'a [Creator], query: &str) -> Vec<&'a Creator> {
    let query = query.trim().to_lowercase();
    creators
        .iter()
        .filter(|c| query.is_empty() || c.name.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(id: i64, name: &str) -> Creator {
        Creator {
            id,
            name: name.to_string(),
            youtube_channel_id: format!("UC{}", id),
            profile_image_url: None,
        }
    }

    #[test]
    fn test_filter_creators() {
        let creators = vec![
            creator(1, "Chloe Ting"),
            creator(2, "Jeff Nippard"),
            creator(3, "Athlean-X"),
        ];

        let matched: Vec<i64> = filter_creators(&creators, "  NIPP ").iter().map(|c| c.id).collect();
        assert_eq!(matched, vec![2]);

        assert_eq!(filter_creators(&creators, "").len(), 3);
        assert!(filter_creators(&creators, "yoga").is_empty());
    }

    #[test]
    fn test_featured_creator_json_is_camel_case() {
        let featured = FeaturedCreator {
            creator: creator(4, "Chloe Ting"),
            video_count: 2,
        };
        let value = serde_json::to_value(&featured).unwrap();

        assert_eq!(value["videoCount"], 2);
        assert_eq!(value["youtubeChannelId"], "UC4");
        assert!(value.get("video_count").is_none());
    }
}
