// Intermediate comment records produced by the record parsers and consumed
// by the cross-reference resolver. They are not part of the public model:
// after resolution only the `comment` field on the owning entity remains.

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BusNodeComment {
    pub(crate) node_name: String,
    pub(crate) comment: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MessageComment {
    pub(crate) msg_id: u32,
    pub(crate) comment: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SignalComment {
    pub(crate) msg_id: u32,
    pub(crate) signal_name: String,
    pub(crate) comment: String,
}
