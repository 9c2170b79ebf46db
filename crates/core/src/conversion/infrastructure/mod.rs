pub mod ffmpeg_args;
pub mod ffmpeg_binaries;
pub mod ffmpeg_converter;
pub mod ffprobe_reader;
