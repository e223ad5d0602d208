//! Static `sensor_msgs/msg/JointState` payload for the fallback publisher

use serde::Serialize;

pub const JOINT_STATE_TYPE: &str = "sensor_msgs/msg/JointState";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stamp {
    pub sec: i32,
    pub nanosec: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub stamp: Stamp,
    pub frame_id: String,
}

/// Joint state message in the YAML/JSON form accepted by `ros2 topic pub`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointStateMessage {
    pub header: Header,
    pub name: Vec<String>,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub effort: Vec<f64>,
}

impl JointStateMessage {
    /// All joints at rest at the zero position
    pub fn zeroed(frame_id: &str, joints: &[String]) -> Self {
        let zeros = vec![0.0; joints.len()];
        Self {
            header: Header {
                stamp: Stamp::default(),
                frame_id: frame_id.to_string(),
            },
            name: joints.to_vec(),
            position: zeros.clone(),
            velocity: zeros.clone(),
            effort: zeros,
        }
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// `ros2 topic pub -r <rate> <topic> sensor_msgs/msg/JointState <payload>`
pub fn publish_command(
    topic: &str,
    rate_hz: u32,
    message: &JointStateMessage,
) -> serde_json::Result<Vec<String>> {
    Ok(vec![
        "ros2".to_string(),
        "topic".to_string(),
        "pub".to_string(),
        "-r".to_string(),
        rate_hz.to_string(),
        topic.to_string(),
        JOINT_STATE_TYPE.to_string(),
        message.to_payload()?,
    ])
}
