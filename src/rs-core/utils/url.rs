use std::fmt::Display;

/// Abstraction allowing to help with the handling of URLs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Url {
    inner: String,
}

impl Url {
    pub fn new(url: String) -> Self {
        Self { inner: url }
    }

    pub fn get_ref(&self) -> &str {
        self.inner.as_str()
    }

    pub fn is_absolute(&self) -> bool {
        is_absolute_url(self.inner.as_bytes())
    }

    /// Returns the host part of the URL, lowercased and without any port or
    /// leading `www.`/`m.` subdomain.
    ///
    /// URLs written without a scheme (e.g. `youtu.be/abc`) are also handled,
    /// as long as their first path component looks like a domain name.
    pub fn host(&self) -> Option<String> {
        let without_scheme = self.without_scheme();
        let end = without_scheme
            .find(|c| c == '/' || c == '?' || c == '#')
            .unwrap_or(without_scheme.len());
        let authority = &without_scheme[..end];
        let host = match authority.rfind('@') {
            Some(idx) => &authority[idx + 1..],
            None => authority,
        };
        let host = match host.find(':') {
            Some(idx) => &host[..idx],
            None => host,
        };
        if host.is_empty() || !host.contains('.') {
            return None;
        }
        let host = host.to_ascii_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(&host)
            .to_owned();
        Some(host)
    }

    /// Returns the non-empty segments of the URL's path, query string and
    /// fragment excluded.
    pub fn path_segments(&self) -> Vec<&str> {
        let without_scheme = self.without_scheme();
        let parsed = strip_query_and_fragment(without_scheme);
        let path = match parsed.find('/') {
            Some(idx) => &parsed[idx..],
            None => "",
        };
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Returns the value of the first query parameter named `name`, if one.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let no_fragment = match self.inner.find('#') {
            Some(idx) => &self.inner[0..idx],
            None => &self.inner,
        };
        let query = &no_fragment[no_fragment.find('?')? + 1..];
        query.split('&').find_map(|pair| {
            let mut split = pair.splitn(2, '=');
            let key = split.next()?;
            if key == name {
                Some(split.next().unwrap_or(""))
            } else {
                None
            }
        })
    }

    fn without_scheme(&self) -> &str {
        if self.is_absolute() {
            match self.inner.find("//") {
                Some(idx) => &self.inner[idx + 2..],
                None => &self.inner,
            }
        } else {
            self.inner.strip_prefix("//").unwrap_or(&self.inner)
        }
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_ref())
    }
}

fn strip_query_and_fragment(url: &str) -> &str {
    match url.find(|c| c == '?' || c == '#') {
        Some(idx) => &url[0..idx],
        None => url,
    }
}

fn is_absolute_url(bytes: &[u8]) -> bool {
    let mut offset = 0;
    loop {
        if bytes.len() < offset + 1 {
            return false;
        }
        if bytes[offset].is_ascii_alphabetic() {
            offset += 1;
            continue;
        } else if bytes[offset] == b':' {
            if offset == 0 {
                return false;
            }
            offset += 1;
            break;
        } else {
            break;
        }
    }

    if bytes.len() < offset + 2 {
        false
    } else {
        &bytes[offset..offset + 2] == b"//"
    }
}
