#![allow(dead_code)]

pub use shadowpack_test_utils::builders::ProjectBuilder;
pub use shadowpack_test_utils::fakes::{
    ChannelCall, FakeCompiler, MarkingTransform, RecordingChannel,
};
pub use shadowpack_test_utils::tree::{age, age_tree, freshen, read_tree, sample_app, write_file};
pub use shadowpack_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
