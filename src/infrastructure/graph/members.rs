//! Paginated transitive-membership traversal.

use futures::stream::{self, Stream, TryStreamExt};

use crate::domain::{DirectoryMember, SyncError};
use crate::infrastructure::graph::client::{GraphClient, ODataPage};
use crate::infrastructure::http_client::HttpClientTrait;

const PAGE_SIZE: u32 = 999;
const MEMBER_FIELDS: &str = "id,displayName,mail,userPrincipalName";

/// Forward-only cursor over a group's transitive members, filtered to user
/// objects. One Graph page is fetched per [`next_page`](Self::next_page)
/// call; the traversal ends when the server stops returning a continuation
/// link.
///
/// Continuation links are followed verbatim: they carry opaque skip-tokens
/// that cannot be reconstructed client-side. Restart by building a new pager.
#[derive(Debug)]
pub struct TransitiveMembersPager<C: HttpClientTrait> {
    client: GraphClient<C>,
    next_url: Option<String>,
}

impl<C: HttpClientTrait> TransitiveMembersPager<C> {
    pub fn new(client: GraphClient<C>, group_id: &str) -> Self {
        let first_url = format!(
            "{}/groups/{}/transitiveMembers?$select={}&$top={}",
            client.base_url(),
            group_id,
            MEMBER_FIELDS,
            PAGE_SIZE
        );

        Self {
            client,
            next_url: Some(first_url),
        }
    }

    /// Fetches the next page, returning its user-type members in server
    /// order. `Ok(None)` means the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<DirectoryMember>>, SyncError> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        let page: ODataPage<DirectoryMember> = self.client.get_page(&url).await?;
        self.next_url = page.next_link;

        Ok(Some(
            page.value.into_iter().filter(|m| m.is_user()).collect(),
        ))
    }

    /// Consumes the pager into a lazy stream of members, one page fetched
    /// per boundary.
    pub fn into_stream(self) -> impl Stream<Item = Result<DirectoryMember, SyncError>> {
        stream::try_unfold(self, |mut pager| async move {
            match pager.next_page().await? {
                Some(members) => Ok(Some((
                    stream::iter(members.into_iter().map(Ok::<_, SyncError>)),
                    pager,
                ))),
                None => Ok(None),
            }
        })
        .try_flatten()
    }
}
