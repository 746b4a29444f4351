mod block_processor;
mod unchecked_map;

pub use block_processor::{
    BlockContext, BlockProcessor, BlockProcessorConfig, BlockProcessorExt, BlockSource,
};
pub use unchecked_map::UncheckedMap;
