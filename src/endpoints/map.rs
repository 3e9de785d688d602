pub(super) const INDEX_HTML: &str = r##"<!DOCTYPE html>
  <html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
    <title>Firesight</title>
    <link
      rel="stylesheet"
      href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
      integrity="sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY="
      crossorigin=""
    />
    <style>
      html, body { height: 100%; margin: 0; padding: 0; }
      #map { height: 100%; width: 100%; }
      .info.legend {
        background: white;
        padding: 6px;
        border-radius: 4px;
        box-shadow: 0 0 15px rgba(0,0,0,0.2);
        line-height: 20px;
      }
      .legend i {
        width: 14px;
        height: 14px;
        display: inline-block;
        margin-right: 6px;
        vertical-align: middle;
      }
    </style>
  </head>
  <body>
    <div id="map"></div>

    <script
      src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
      integrity="sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo="
      crossorigin=""
    ></script>

    <script>
      const map = L.map('map').setView([38.50, -122.91], 10);

      const basemaps = {
        'OpenStreetMap': L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
          attribution: '&copy; OpenStreetMap contributors'
        }),
        'Carto Light': L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png'),
        'ESRI Satellite': L.tileLayer('https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}')
      };
      basemaps['ESRI Satellite'].addTo(map);

      // Legend, filled in as overlays load
      const legend = L.control({ position: 'bottomleft' });
      legend.onAdd = function () {
        return L.DomUtil.create('div', 'info legend');
      };
      legend.addTo(map);

      function legendSwatch(colour, extra) {
        return `<i style="background:${colour};${extra || ''}"></i>`;
      }

      // Tracks which overlays are toggled on; mirrored to the server so
      // point queries are suppressed while the raster is hidden.
      const activeLayers = new Set();

      function postToggle(event, layer) {
        fetch('/layers/events', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ event: event, layer: layer })
        }).catch(err => console.error('Error posting toggle event:', err));
      }

      map.on('overlayadd', e => { activeLayers.add(e.name); postToggle('added', e.name); });
      map.on('overlayremove', e => { activeLayers.delete(e.name); postToggle('removed', e.name); });

      let riskOverlayName = null;

      async function initOverlays() {
        const res = await fetch('/layers');
        const overlays = await res.json();

        const controlEntries = {};
        const legendDiv = document.querySelector('.info.legend');

        for (const overlay of overlays) {
          const pane = overlay.name.replace(/\s+/g, '') + 'Pane';
          map.createPane(pane);
          map.getPane(pane).style.zIndex = overlay.z_index;

          let layer;
          if (overlay.kind === 'raster') {
            riskOverlayName = overlay.name;
            layer = L.tileLayer(overlay.url, { pane: pane, opacity: 0.7, tileSize: 256 });
            legendDiv.innerHTML += `<hr style="margin:6px 0;"><b>${overlay.name}</b><br>`;
            legendDiv.innerHTML += `${legendSwatch('rgba(255,255,0,0.8)')} Moderate<br>`;
            legendDiv.innerHTML += `${legendSwatch('rgba(255,165,0,0.6)')} High<br>`;
            legendDiv.innerHTML += `${legendSwatch('rgba(255,0,0,0.5)')} Very High<br>`;

            const extent = overlay.geometry['4326'].extent;
            map.fitBounds([[extent.miny, extent.minx], [extent.maxy, extent.maxx]]);
          } else {
            const style = overlay.style || {};
            const data = await fetch(overlay.url).then(r => r.json());
            layer = L.geoJSON(data, {
              pane: pane,
              pointToLayer: (feature, latlng) => style.radius
                ? L.circleMarker(latlng, {
                    pane: pane,
                    radius: style.radius,
                    fillColor: style.fill_color || style.color,
                    color: style.color,
                    weight: style.weight,
                    fillOpacity: style.fill_opacity
                  })
                : L.marker(latlng, { pane: pane }),
              style: {
                color: style.color,
                weight: style.weight,
                fillOpacity: style.fill_opacity
              },
              onEachFeature: (feature, l) => {
                if (!feature.properties) return;
                l.on('click', () => {
                  if (!activeLayers.has(overlay.name)) return;
                  let popup = `<b>${overlay.name}:</b><br>`;
                  for (const key in feature.properties) {
                    popup += `<b>${key}:</b> ${feature.properties[key]}<br>`;
                  }
                  l.bindPopup(popup).openPopup();
                });
              }
            });
            const swatch = style.fill_color || style.color || 'grey';
            legendDiv.innerHTML += `${legendSwatch(swatch, 'border:1px solid #333;')} ${overlay.name}<br>`;
          }

          controlEntries[overlay.name] = layer;
          if (overlay.default_on) {
            layer.addTo(map);
            activeLayers.add(overlay.name);
          }
        }

        L.control.layers(basemaps, controlEntries, { collapsed: false }).addTo(map);
      }

      // Click anywhere: ask the server for the risk class at that point.
      // The server suppresses the answer while the raster overlay is off,
      // but skip the round trip entirely when we know it is hidden.
      map.on('click', async e => {
        if (!riskOverlayName || !activeLayers.has(riskOverlayName)) return;

        try {
          const res = await fetch(`/query?lon=${e.latlng.lng}&lat=${e.latlng.lat}`);
          if (res.status === 204) return;
          const result = await res.json();
          const content = result.value === null
            ? 'No data here'
            : `<b>Fire Risk:</b> ${result.category}`;
          L.popup().setLatLng(e.latlng).setContent(content).openOn(map);
        } catch (err) {
          console.error('Error querying fire risk:', err);
        }
      });

      initOverlays().catch(console.error);
    </script>
  </body>
  </html>
"##;
