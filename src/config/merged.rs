use super::job::{Job, parse_classes};
use super::settings::Settings;
use crate::model::ElementClass;

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub classes: Vec<ElementClass>,
    pub compress_streams: bool,
    pub parallel_workers: usize,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        let class_names = job.classes.as_ref().unwrap_or(&settings.classes);
        MergedConfig {
            classes: parse_classes(class_names),
            compress_streams: job.compress_streams.unwrap_or(settings.compress_streams),
            parallel_workers: settings.parallel_workers,
        }
    }
}
