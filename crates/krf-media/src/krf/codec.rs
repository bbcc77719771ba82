//! Codec ids and the audio flag byte.


/// Codec identifier handed to the consumer of the demuxed streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum CodecId {
    Mpeg4,
    H263,
    H264,
    Mjpeg,
    Hevc,
    Aac,
    PcmMulaw,
    PcmAlaw,
    AdpcmSwf,
    PcmU8,
    PcmS16Le,
    Speex,
    Mp3,
    AdpcmG726,
    /// Unrecognized codec id; the consumer's default applies.
    None,
}

impl CodecId {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mpeg4 => "mpeg4",
            Self::H263 => "h263",
            Self::H264 => "h264",
            Self::Mjpeg => "mjpeg",
            Self::Hevc => "hevc",
            Self::Aac => "aac",
            Self::PcmMulaw => "pcm_mulaw",
            Self::PcmAlaw => "pcm_alaw",
            Self::AdpcmSwf => "adpcm_swf",
            Self::PcmU8 => "pcm_u8",
            Self::PcmS16Le => "pcm_s16le",
            Self::Speex => "speex",
            Self::Mp3 => "mp3",
            Self::AdpcmG726 => "adpcm_g726",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for CodecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Video codec as stored in a KRF track header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum VideoCodec {
    Mpeg4,
    H263,
    H264,
    Mjpeg,
    Hevc,
    Unknown(u8),
}

impl VideoCodec {
    pub const ID_MPEG4: u8 = 0x4C;
    pub const ID_H263: u8 = 0x4D;
    pub const ID_H264: u8 = 0x4E;
    pub const ID_MJPEG: u8 = 0x4F;
    pub const ID_HEVC: u8 = 0x50;

    pub fn from_u8(id: u8) -> Self {
        match id {
            Self::ID_MPEG4 => Self::Mpeg4,
            Self::ID_H263 => Self::H263,
            Self::ID_H264 => Self::H264,
            Self::ID_MJPEG => Self::Mjpeg,
            Self::ID_HEVC => Self::Hevc,
            other => Self::Unknown(other),
        }
    }

    pub fn codec_id(&self) -> CodecId {
        match self {
            Self::Mpeg4 => CodecId::Mpeg4,
            Self::H263 => CodecId::H263,
            Self::H264 => CodecId::H264,
            Self::Mjpeg => CodecId::Mjpeg,
            Self::Hevc => CodecId::Hevc,
            Self::Unknown(_) => CodecId::None,
        }
    }
}

/// Audio codec as stored in a KRF track header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum AudioCodec {
    AacRaw,
    AacAdts,
    AacLatm,
    G711Mulaw,
    G711Alaw,
    Adpcm,
    Pcm,
    Speex,
    Mp3,
    G726,
    Unknown(u8),
}

impl AudioCodec {
    pub const ID_AAC_RAW: u8 = 0x86;
    pub const ID_AAC_ADTS: u8 = 0x87;
    pub const ID_AAC_LATM: u8 = 0x88;
    pub const ID_G711_MULAW: u8 = 0x89;
    pub const ID_G711_ALAW: u8 = 0x8A;
    pub const ID_ADPCM: u8 = 0x8B;
    pub const ID_PCM: u8 = 0x8C;
    pub const ID_SPEEX: u8 = 0x8D;
    pub const ID_MP3: u8 = 0x8E;
    pub const ID_G726: u8 = 0x8F;

    pub fn from_u8(id: u8) -> Self {
        match id {
            Self::ID_AAC_RAW => Self::AacRaw,
            Self::ID_AAC_ADTS => Self::AacAdts,
            Self::ID_AAC_LATM => Self::AacLatm,
            Self::ID_G711_MULAW => Self::G711Mulaw,
            Self::ID_G711_ALAW => Self::G711Alaw,
            Self::ID_ADPCM => Self::Adpcm,
            Self::ID_PCM => Self::Pcm,
            Self::ID_SPEEX => Self::Speex,
            Self::ID_MP3 => Self::Mp3,
            Self::ID_G726 => Self::G726,
            other => Self::Unknown(other),
        }
    }

    /// Output codec. PCM picks U8 or S16LE from the sample depth.
    pub fn codec_id(&self, params: &AudioParams) -> CodecId {
        match self {
            Self::AacRaw | Self::AacAdts | Self::AacLatm => CodecId::Aac,
            Self::G711Mulaw => CodecId::PcmMulaw,
            Self::G711Alaw => CodecId::PcmAlaw,
            Self::Adpcm => CodecId::AdpcmSwf,
            Self::Pcm if params.bits_per_sample == 8 => CodecId::PcmU8,
            Self::Pcm => CodecId::PcmS16Le,
            Self::Speex => CodecId::Speex,
            Self::Mp3 => CodecId::Mp3,
            Self::G726 => CodecId::AdpcmG726,
            Self::Unknown(_) => CodecId::None,
        }
    }

    /// Whether units need further bitstream framing by the consumer.
    pub fn needs_parsing(&self) -> bool {
        matches!(self, Self::AacAdts | Self::AacLatm | Self::Mp3)
    }
}

/// Sample rate codes carried in bits 2.. of the audio flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz8000 = 0,
    Hz11000 = 1,
    Hz12000 = 2,
    Hz16000 = 3,
    Hz22000 = 4,
    Hz24000 = 5,
    Hz32000 = 6,
    Hz44000 = 7,
    Hz48000 = 8,
}

impl SampleRate {
    /// Decode a rate code. Unknown codes fall back to 8 kHz.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Hz11000,
            2 => Self::Hz12000,
            3 => Self::Hz16000,
            4 => Self::Hz22000,
            5 => Self::Hz24000,
            6 => Self::Hz32000,
            7 => Self::Hz44000,
            8 => Self::Hz48000,
            _ => Self::Hz8000,
        }
    }

    pub fn hz(&self) -> u32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz11000 => 11000,
            Self::Hz12000 => 12000,
            Self::Hz16000 => 16000,
            Self::Hz22000 => 22000,
            Self::Hz24000 => 24000,
            Self::Hz32000 => 32000,
            Self::Hz44000 => 44000,
            Self::Hz48000 => 48000,
        }
    }
}

/// Audio parameters decoded from the flag byte.
///
/// Bit 0 selects stereo, bit 1 selects 16-bit samples, the remaining high
/// bits hold the sample rate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioParams {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioParams {
    pub fn from_flag(flag: u8) -> Self {
        Self {
            sample_rate: SampleRate::from_code(flag >> 2).hz(),
            channels: if flag & 0x1 != 0 { 2 } else { 1 },
            bits_per_sample: if flag & 0x2 != 0 { 16 } else { 8 },
        }
    }
}
