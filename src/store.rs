use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::BackendError;
use crate::video::{Video, VideoId, VideoUpdate};

pub trait Store: Send + Sync {
    /// Returns every video in insertion order.
    fn list(&self) -> Result<Vec<Video>, BackendError>;

    /// Returns the video with the given ID, if any.
    fn find(&self, id: VideoId) -> Result<Option<Video>, BackendError>;

    /// Adds a video after all existing ones.
    fn append(&self, video: Video) -> Result<(), BackendError>;

    /// Applies an update to the video with the given ID, returning the
    /// updated video or `None` if there is no such video.
    fn update(&self, id: VideoId, update: VideoUpdate) -> Result<Option<Video>, BackendError>;

    /// Removes the video with the given ID. Returns whether anything was removed.
    fn remove(&self, id: VideoId) -> Result<bool, BackendError>;
}

/// A store that keeps its videos in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    videos: RwLock<Vec<Video>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Video>>, BackendError> {
        self.videos.read().map_err(|_| BackendError::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Video>>, BackendError> {
        self.videos.write().map_err(|_| BackendError::StorePoisoned)
    }
}

impl Store for MemoryStore {
    fn list(&self) -> Result<Vec<Video>, BackendError> {
        Ok(self.read()?.clone())
    }

    fn find(&self, id: VideoId) -> Result<Option<Video>, BackendError> {
        Ok(self.read()?.iter().find(|v| v.id() == id).cloned())
    }

    fn append(&self, video: Video) -> Result<(), BackendError> {
        let mut videos = self.write()?;

        if videos.iter().any(|v| v.id() == video.id()) {
            return Err(BackendError::DuplicateId(video.id()));
        }

        videos.push(video);

        Ok(())
    }

    fn update(&self, id: VideoId, update: VideoUpdate) -> Result<Option<Video>, BackendError> {
        let mut videos = self.write()?;

        Ok(videos.iter_mut().find(|v| v.id() == id).map(|video| {
            video.apply(update);
            video.clone()
        }))
    }

    fn remove(&self, id: VideoId) -> Result<bool, BackendError> {
        let mut videos = self.write()?;

        match videos.iter().position(|v| v.id() == id) {
            Some(index) => {
                videos.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use time::macros::datetime;

    use super::{MemoryStore, Store};
    use crate::errors::BackendError;
    use crate::video::{Video, VideoFields, VideoId, VideoUpdate};

    fn video(id: VideoId, title: &str) -> Video {
        let fields = VideoFields {
            title: title.to_owned(),
            author: "Author".to_owned(),
            available_resolutions: vec!["P144".to_owned()],
        };

        Video::create(id, fields, datetime!(2021-03-04 05:06:07 UTC)).expect("create video")
    }

    fn update(title: &str) -> VideoUpdate {
        VideoUpdate {
            fields: VideoFields {
                title: title.to_owned(),
                author: "Someone else".to_owned(),
                available_resolutions: vec![],
            },
            publication_date: "2030-01-01T00:00:00Z".to_owned(),
        }
    }

    fn titles(store: &MemoryStore) -> Vec<String> {
        store
            .list()
            .unwrap()
            .iter()
            .map(|v| v.title().to_owned())
            .collect()
    }

    #[test]
    fn starts_empty() {
        let store = MemoryStore::new();

        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.find(1).unwrap(), None);
    }

    #[test]
    fn keeps_insertion_order() {
        let store = MemoryStore::new();
        store.append(video(3, "c")).unwrap();
        store.append(video(1, "a")).unwrap();
        store.append(video(2, "b")).unwrap();

        assert_eq!(titles(&store), vec!["c", "a", "b"]);
    }

    #[test]
    fn finds_by_id() {
        let store = MemoryStore::new();
        store.append(video(1, "a")).unwrap();
        store.append(video(2, "b")).unwrap();

        assert_eq!(store.find(2).unwrap(), Some(video(2, "b")));
        assert_eq!(store.find(3).unwrap(), None);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let store = MemoryStore::new();
        store.append(video(1, "a")).unwrap();

        assert!(matches!(
            store.append(video(1, "b")),
            Err(BackendError::DuplicateId(1))
        ));
        assert_eq!(titles(&store), vec!["a"]);
    }

    #[test]
    fn updates_in_place() {
        let store = MemoryStore::new();
        store.append(video(1, "a")).unwrap();
        store.append(video(2, "b")).unwrap();

        let updated = store.update(1, update("z")).unwrap().expect("video exists");

        assert_eq!(updated.title(), "z");
        assert_eq!(store.find(1).unwrap(), Some(updated));
        assert_eq!(titles(&store), vec!["z", "b"]);
        assert_eq!(store.update(5, update("y")).unwrap(), None);
    }

    #[test]
    fn removes_by_id() {
        let store = MemoryStore::new();
        store.append(video(1, "a")).unwrap();
        store.append(video(2, "b")).unwrap();

        assert!(store.remove(1).unwrap());
        assert!(!store.remove(1).unwrap());
        assert_eq!(store.find(1).unwrap(), None);
        assert_eq!(titles(&store), vec!["b"]);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let store = Arc::new(MemoryStore::new());

        {
            let store = store.clone();
            let _ = thread::spawn(move || {
                let _guard = store.videos.write().unwrap();
                panic!("poison the lock");
            })
            .join();
        }

        assert!(matches!(store.list(), Err(BackendError::StorePoisoned)));
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let store = Arc::new(MemoryStore::new());

        let handles = (0..4)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        store.append(video(t * 1000 + i, "v")).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().expect("join thread");
        }

        assert_eq!(store.list().unwrap().len(), 200);
    }
}
