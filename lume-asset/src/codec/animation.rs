use super::{AssetFile, ByteReader, count_u32, write_pod, write_pods};
use crate::{AnimationAsset, AnimationClip, AnimationFrame, AnimationJoint, Matrix, validate_joints};
use lume_core::{LumeError, LumeResult};
use std::io::Write;

/// Byte length of one frame record: its time plus one matrix per joint.
pub fn frame_byte_len(joint_count: usize) -> usize {
    std::mem::size_of::<f64>() + joint_count * std::mem::size_of::<Matrix>()
}

/// Writes the bind-pose joints followed by the sampled clip:
///
/// ```text
/// u32 joint_count, AnimationJoint[..]
/// f64 duration, u32 frame_byte_len, u32 frame_count
/// { f64 time, Matrix[joint_count] }[frame_count]
/// ```
pub fn encode_animation<W: Write>(joints: &[AnimationJoint], clip: &AnimationClip, writer: &mut W) -> LumeResult<u64> {
    validate_joints(joints)?;
    for (f, frame) in clip.frames.iter().enumerate() {
        if frame.transforms.len() != joints.len() {
            return Err(LumeError::InvalidArgument(format!(
                "frame {} has {} transforms for {} joints",
                f,
                frame.transforms.len(),
                joints.len()
            )));
        }
    }

    let joint_count = count_u32(joints.len(), "joints")?;
    let frame_len = count_u32(frame_byte_len(joints.len()), "frame bytes")?;
    let frame_count = count_u32(clip.frames.len(), "frames")?;

    let mut written = write_pod(writer, &joint_count)?;
    written += write_pods(writer, joints)?;
    written += write_pod(writer, &clip.duration)?;
    written += write_pod(writer, &frame_len)?;
    written += write_pod(writer, &frame_count)?;
    for frame in &clip.frames {
        written += write_pod(writer, &frame.time)?;
        written += write_pods(writer, &frame.transforms)?;
    }
    Ok(written)
}

pub fn decode_animation(bytes: &[u8]) -> LumeResult<AnimationAsset> {
    let mut reader = ByteReader::new(bytes);
    let joint_count = reader.read::<u32>("joint count")? as usize;
    let joints = reader.read_many::<AnimationJoint>(joint_count, "joints")?;
    validate_joints(&joints).map_err(|e| LumeError::MalformedAsset(e.to_string()))?;

    let duration = reader.read::<f64>("duration")?;
    let frame_len = reader.read::<u32>("frame byte length")? as usize;
    if frame_len != frame_byte_len(joint_count) {
        return Err(LumeError::MalformedAsset(format!(
            "frame byte length {} does not match {} joints",
            frame_len, joint_count
        )));
    }

    let frame_count = reader.read::<u32>("frame count")? as usize;
    let mut frames = Vec::with_capacity(frame_count.min(bytes.len() / frame_len.max(1)));
    for _ in 0..frame_count {
        let time = reader.read::<f64>("frame time")?;
        let transforms = reader.read_many::<Matrix>(joint_count, "frame transforms")?;
        frames.push(AnimationFrame { time, transforms });
    }
    reader.finish()?;

    Ok(AnimationAsset { joints, clip: AnimationClip { duration, frames } })
}

impl AssetFile for AnimationAsset {
    const EXTENSION: &'static str = "anim";

    fn encode<W: Write>(&self, writer: &mut W) -> LumeResult<u64> {
        encode_animation(&self.joints, &self.clip, writer)
    }

    fn decode(bytes: &[u8]) -> LumeResult<Self> {
        decode_animation(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn two_joint_asset() -> AnimationAsset {
        let root = Matrix::from(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let child = Matrix::from(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        let joints = vec![
            AnimationJoint { transform: root, parent_index: -1 },
            AnimationJoint { transform: child, parent_index: 0 },
        ];
        let frames = (1..4)
            .map(|i| {
                let t = i as f64 / 30.0;
                let moved = Matrix::from(Mat4::from_translation(Vec3::new(t as f32, 2.0, 0.0)));
                AnimationFrame { time: t, transforms: vec![root, moved] }
            })
            .collect();
        AnimationAsset { joints, clip: AnimationClip { duration: 4.0 / 30.0, frames } }
    }

    #[test]
    fn layout_matches_joint_and_frame_widths() {
        let asset = two_joint_asset();
        let mut bytes = Vec::new();
        let written = encode_animation(&asset.joints, &asset.clip, &mut bytes).unwrap();
        assert_eq!(written as usize, bytes.len());

        let joints_end = 4 + 2 * 68;
        assert_eq!(bytes.len(), joints_end + 8 + 4 + 4 + 3 * (8 + 2 * 64));
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        // parent index of the second joint closes its 68-byte record
        assert_eq!(&bytes[joints_end - 4..joints_end], &0i32.to_le_bytes());
        assert_eq!(&bytes[4 + 64..4 + 68], &(-1i32).to_le_bytes());

        assert_eq!(&bytes[joints_end..joints_end + 8], &(4.0f64 / 30.0).to_le_bytes());
        assert_eq!(&bytes[joints_end + 8..joints_end + 12], &(8u32 + 2 * 64).to_le_bytes());
        assert_eq!(&bytes[joints_end + 12..joints_end + 16], &3u32.to_le_bytes());
        assert_eq!(&bytes[joints_end + 16..joints_end + 24], &(1.0f64 / 30.0).to_le_bytes());
    }

    #[test]
    fn decode_reads_back_joints_and_frames() {
        let asset = two_joint_asset();
        let mut bytes = Vec::new();
        asset.encode(&mut bytes).unwrap();
        assert_eq!(decode_animation(&bytes).unwrap(), asset);
    }

    #[test]
    fn mismatched_frame_width_is_rejected() {
        let mut asset = two_joint_asset();
        asset.clip.frames[1].transforms.pop();
        let mut bytes = Vec::new();
        assert!(matches!(asset.encode(&mut bytes), Err(LumeError::InvalidArgument(_))));
    }

    #[test]
    fn child_before_parent_is_rejected() {
        let mut asset = two_joint_asset();
        asset.joints[0].parent_index = 1;
        let mut bytes = Vec::new();
        assert!(asset.encode(&mut bytes).is_err());
    }

    #[test]
    fn corrupted_frame_length_is_malformed() {
        let asset = two_joint_asset();
        let mut bytes = Vec::new();
        asset.encode(&mut bytes).unwrap();
        let at = 4 + 2 * 68 + 8;
        bytes[at..at + 4].copy_from_slice(&64u32.to_le_bytes());
        assert!(matches!(decode_animation(&bytes), Err(LumeError::MalformedAsset(_))));
    }

    #[test]
    fn skeleton_without_frames_still_round_trips() {
        let mut asset = two_joint_asset();
        asset.clip.frames.clear();
        let mut bytes = Vec::new();
        asset.encode(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 68 + 16);
        assert_eq!(decode_animation(&bytes).unwrap(), asset);
    }
}
