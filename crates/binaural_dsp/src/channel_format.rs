use std::num::NonZeroUsize;

/// The layout of an interleaved input block.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::IsVariant)]
pub enum ChannelFormat {
    /// Single-channel mono audio.
    Mono,

    /// Stereo audio: 2 channels [l r].
    Stereo,

    /// Some other number of channels with no particular interpretation.
    Raw { channels: NonZeroUsize },
}

impl ChannelFormat {
    /// Pick the most specific format for a channel count.
    pub fn from_channel_count(channels: NonZeroUsize) -> ChannelFormat {
        match channels.get() {
            1 => ChannelFormat::Mono,
            2 => ChannelFormat::Stereo,
            _ => ChannelFormat::Raw { channels },
        }
    }

    pub fn get_channel_count(&self) -> NonZeroUsize {
        match self {
            ChannelFormat::Mono => NonZeroUsize::new(1).unwrap(),
            ChannelFormat::Stereo => NonZeroUsize::new(2).unwrap(),
            ChannelFormat::Raw { channels } => *channels,
        }
    }

    /// How many frames `samples` interleaved samples make up.
    ///
    /// A trailing partial frame counts as a frame; its missing samples are treated as absent.
    pub fn frames_in(&self, samples: usize) -> usize {
        samples.div_ceil(self.get_channel_count().get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(ChannelFormat::Mono.get_channel_count().get(), 1);
        assert_eq!(ChannelFormat::Stereo.get_channel_count().get(), 2);
        let six = NonZeroUsize::new(6).unwrap();
        assert_eq!(ChannelFormat::from_channel_count(six).get_channel_count(), six);
        assert!(ChannelFormat::from_channel_count(NonZeroUsize::new(2).unwrap()).is_stereo());
    }

    #[test]
    fn test_frames_in() {
        assert_eq!(ChannelFormat::Stereo.frames_in(8), 4);
        assert_eq!(ChannelFormat::Stereo.frames_in(7), 4);
        assert_eq!(ChannelFormat::Mono.frames_in(7), 7);
        assert_eq!(ChannelFormat::Stereo.frames_in(0), 0);
    }
}
